// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the joke endpoints

mod fixtures;

use std::sync::Arc;

use axum::http::StatusCode;
use fixtures::*;
use joke_store::{InMemoryJokeStore, JokeStore, NewJoke};
use serde_json::{Value, json};
use wiremock::MockServer;

#[tokio::test]
async fn chuck_and_dad_jokes_are_served() {
    let chuck_norris = MockServer::start().await;
    let dad_joke = MockServer::start().await;
    mock_chuck_norris(&chuck_norris).await;
    mock_dad_joke(&dad_joke).await;
    let server = spawn_with_providers(&chuck_norris, &dad_joke).await;

    let response = server.get_joke("Chuck").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source"], "Chuck");
    assert_eq!(body["text"], CHUCK_NORRIS_JOKE);
    assert_eq!(body["categories"], json!(["dev"]));

    let response = server.get_joke("Dad Joke").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source"], "Dad Joke");
    assert_eq!(body["id"], "R7UfaahVfFd");
    assert_eq!(body["text"], DAD_JOKE);
}

#[tokio::test]
async fn dad_joke_type_is_percent_encoded() {
    let chuck_norris = MockServer::start().await;
    let dad_joke = MockServer::start().await;
    mock_dad_joke(&dad_joke).await;
    let server = spawn_with_providers(&chuck_norris, &dad_joke).await;

    let response = server.get("/api/joke?type=Dad%20Joke").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn own_joke_with_empty_store_is_not_found() {
    let server = spawn_default().await;

    let response = server.get_joke("Propio").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Aún no hay chistes, cree uno!");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn own_joke_comes_from_the_store() {
    let store = Arc::new(InMemoryJokeStore::new());
    let first = store.create(NewJoke::new("First local joke")).await.unwrap();
    let second = store.create(NewJoke::new("Second local joke")).await.unwrap();
    let server = spawn_with_store(store).await;

    let response = server.get_joke("Propio").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["source"], "Propio");
    let id = body["id"].as_str().unwrap();
    assert!(id == first.id.to_string() || id == second.id.to_string());
}

#[tokio::test]
async fn unknown_or_missing_type_is_bad_request() {
    let server = spawn_default().await;

    for path in ["/api/joke?type=Foo", "/api/joke?type=chuck", "/api/joke"] {
        let response = server.get(path).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "invalid_parameter");
    }
}

#[tokio::test]
async fn provider_failure_is_bad_gateway() {
    let chuck_norris = MockServer::start().await;
    let dad_joke = MockServer::start().await;
    mock_failing(&chuck_norris, 500).await;
    mock_failing(&dad_joke, 503).await;
    let server = spawn_with_providers(&chuck_norris, &dad_joke).await;

    assert_eq!(server.get_joke("Chuck").await.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(server.get_joke("Dad Joke").await.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn malformed_provider_body_is_bad_gateway() {
    let chuck_norris = MockServer::start().await;
    let dad_joke = MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
        .mount(&chuck_norris)
        .await;
    let server = spawn_with_providers(&chuck_norris, &dad_joke).await;

    assert_eq!(server.get_joke("Chuck").await.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn slow_provider_is_gateway_timeout() {
    let chuck_norris = MockServer::start().await;
    let dad_joke = MockServer::start().await;
    mock_slow(&dad_joke).await;
    let server = spawn_with_providers(&chuck_norris, &dad_joke).await;

    let response = server.get_joke("Dad Joke").await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "upstream_timeout");
}

#[tokio::test]
async fn disabled_provider_is_service_unavailable() {
    let server = spawn_default().await;

    let response = server.get_joke("Chuck").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "provider_disabled");
}

#[tokio::test]
async fn create_then_read() {
    let server = spawn_default().await;

    let response = server
        .post_joke(&json!({
            "text": "I told my wife she was drawing her eyebrows too high. She looked surprised.",
            "author": "Ana",
            "rating": 4.5,
            "category": "puns"
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let response = server.get(&format!("/api/joke/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Value = response.json().await.unwrap();

    assert_eq!(fetched["id"], created["id"]);
    assert_eq!(
        fetched["text"],
        "I told my wife she was drawing her eyebrows too high. She looked surprised."
    );
    assert_eq!(fetched["author"], "Ana");
    assert_eq!(fetched["rating"], 4.5);
    assert_eq!(fetched["category"], "puns");
}

#[tokio::test]
async fn create_rejects_invalid_bodies() {
    let server = spawn_default().await;

    let blank = server.post_joke(&json!({"text": "   "})).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let missing_text = server.post_joke(&json!({"author": "Ana"})).await;
    assert_eq!(missing_text.status(), StatusCode::BAD_REQUEST);

    let malformed = server
        .client
        .post(server.url("/api/joke"))
        .header("content-type", "application/json")
        .body(r#"{"text": "unterminated"#)
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    let body: Value = malformed.json().await.unwrap();
    assert_eq!(body["error"], "invalid_json");
}

#[tokio::test]
async fn unknown_and_unparsable_ids_are_not_found() {
    let server = spawn_default().await;

    for id in ["not-a-uuid", "0b6a8f4e-5f0e-4f3c-9d55-9b1f7e2c1a10"] {
        let response = server.get(&format!("/api/joke/{id}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{id}");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Chiste no encontrado");
    }
}

#[tokio::test]
async fn update_replaces_only_provided_fields() {
    let server = spawn_default().await;
    let created: Value = server
        .post_joke(&json!({"text": "Original", "author": "Ana", "category": "puns"}))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let response = server
        .put_joke(id, &json!({"text": "Edited", "rating": 3.0}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["text"], "Edited");
    assert_eq!(updated["author"], "Ana");
    assert_eq!(updated["category"], "puns");
    assert_eq!(updated["rating"], 3.0);
}

#[tokio::test]
async fn update_errors() {
    let server = spawn_default().await;
    let created: Value = server
        .post_joke(&json!({"text": "Original"}))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let blank = server.put_joke(id, &json!({"text": ""})).await;
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let unknown = server
        .put_joke("0b6a8f4e-5f0e-4f3c-9d55-9b1f7e2c1a10", &json!({"text": "x"}))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_read_is_not_found() {
    let server = spawn_default().await;
    let created: Value = server
        .post_joke(&json!({"text": "Short-lived joke"}))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let response = server.delete_joke(id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Chiste eliminado");
    assert_eq!(body["joke"]["id"], created["id"]);

    assert_eq!(
        server.get(&format!("/api/joke/{id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.delete_joke(id).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn count_groups_by_category() {
    let server = spawn_default().await;
    for body in [
        json!({"text": "a", "category": "puns"}),
        json!({"text": "b", "category": "puns"}),
        json!({"text": "c", "category": "dev"}),
        json!({"text": "d"}),
    ] {
        assert_eq!(server.post_joke(&body).await.status(), StatusCode::CREATED);
    }

    let response = server.get("/api/joke/count").await;
    assert_eq!(response.status(), StatusCode::OK);

    let counts: Value = response.json().await.unwrap();
    assert_eq!(counts, json!({"dev": 1, "puns": 2, "uncategorized": 1}));
}

#[tokio::test]
async fn count_of_empty_store_is_empty() {
    let server = spawn_default().await;

    let response = server.get("/api/joke/count").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({}));
}

#[tokio::test]
async fn rating_filter() {
    let server = spawn_default().await;
    for body in [
        json!({"text": "a", "rating": 5}),
        json!({"text": "b", "rating": 3}),
        json!({"text": "c", "rating": 5.0}),
        json!({"text": "d"}),
    ] {
        assert_eq!(server.post_joke(&body).await.status(), StatusCode::CREATED);
    }

    let response = server.get("/api/joke/rating?rating=5").await;
    assert_eq!(response.status(), StatusCode::OK);
    let jokes: Vec<Value> = response.json().await.unwrap();
    let mut texts: Vec<_> = jokes.iter().map(|j| j["text"].as_str().unwrap()).collect();
    texts.sort_unstable();
    assert_eq!(texts, vec!["a", "c"]);

    let response = server.get("/api/joke/rating?rating=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "No hay chistes con este puntaje");
}

#[tokio::test]
async fn rating_filter_rejects_bad_input() {
    let server = spawn_default().await;

    for path in ["/api/joke/rating", "/api/joke/rating?rating=high"] {
        let response = server.get(path).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn list_returns_every_joke() {
    let server = spawn_default().await;
    assert_eq!(
        server.get("/api/jokes").await.json::<Vec<Value>>().await.unwrap(),
        Vec::<Value>::new()
    );

    server.post_joke(&json!({"text": "one"})).await;
    server.post_joke(&json!({"text": "two"})).await;

    let response = server.get("/api/jokes").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Vec<Value>>().await.unwrap().len(), 2);
}
