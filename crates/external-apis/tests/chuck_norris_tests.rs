// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs)]

use api_client::{ApiError, HealthStatus, JokeProvider};
use external_apis::ChuckNorrisError;
use shared_types::JokeSource;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use fixtures::{ChuckNorrisFixture, chuck_norris_client};

#[tokio::test]
async fn fetch_joke_success() {
    let mock_server = MockServer::start().await;
    ChuckNorrisFixture::setup_success_mocks(&mock_server).await;
    let client = chuck_norris_client(&mock_server);

    let joke = client.fetch_joke().await.unwrap();

    assert_eq!(joke.source, JokeSource::Chuck);
    assert_eq!(joke.id, "elgv2wkvt8ioag6xywykbq");
    assert!(joke.text.starts_with("Chuck Norris's keyboard"));
    assert_eq!(
        joke.url.as_deref(),
        Some("https://api.chucknorris.io/jokes/elgv2wkvt8ioag6xywykbq")
    );
    assert_eq!(joke.categories, vec!["dev".to_string()]);
}

#[tokio::test]
async fn server_error_is_reported() {
    let mock_server = MockServer::start().await;
    ChuckNorrisFixture::setup_status_mock(&mock_server, 500).await;
    let client = chuck_norris_client(&mock_server);

    let err = client.get_random_joke().await.unwrap_err();
    assert!(matches!(err, ChuckNorrisError::ApiError { status: 500, .. }));
}

#[tokio::test]
async fn rate_limit_is_reported() {
    let mock_server = MockServer::start().await;
    ChuckNorrisFixture::setup_status_mock(&mock_server, 429).await;
    let client = chuck_norris_client(&mock_server);

    let err = client.fetch_joke().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimitExceeded { .. }));
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;
    let client = chuck_norris_client(&mock_server);

    let err = client.fetch_joke().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse { .. }));
}

#[tokio::test]
async fn empty_joke_is_invalid_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": "x", "value": "   "})),
        )
        .mount(&mock_server)
        .await;
    let client = chuck_norris_client(&mock_server);

    let err = client.get_random_joke().await.unwrap_err();
    assert!(matches!(err, ChuckNorrisError::EmptyJoke));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mock_server = MockServer::start().await;
    ChuckNorrisFixture::setup_slow_mock(&mock_server).await;
    let client = chuck_norris_client(&mock_server);

    let err = client.fetch_joke().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn health_check_up() {
    let mock_server = MockServer::start().await;
    ChuckNorrisFixture::setup_success_mocks(&mock_server).await;
    let client = chuck_norris_client(&mock_server);

    assert_eq!(client.health_check().await.unwrap(), HealthStatus::Up);
}

#[tokio::test]
async fn health_check_down_on_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jokes/categories"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    let client = chuck_norris_client(&mock_server);

    let status = client.health_check().await.unwrap();
    assert!(status.is_down());
}
