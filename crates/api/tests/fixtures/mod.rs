// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

//! Test fixtures for the jokes API
//!
//! Starts the server on an ephemeral port, with providers pointed at wiremock
//! servers and the joke store injected by the test.

use std::{sync::Arc, time::Duration};

use api::{
    Server, ServerConfig, ShutdownConfig,
    config::{ProviderConfig, RateLimitingConfig},
};
use external_apis::ProviderRegistry;
use joke_store::{InMemoryJokeStore, JokeStore};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const CHUCK_NORRIS_JOKE: &str =
    "Chuck Norris's keyboard doesn't have a Ctrl key because nothing controls Chuck Norris.";
pub const DAD_JOKE: &str =
    "My dog used to chase people on a bike a lot. It got so bad I had to take his bike away.";

/// A server running in the background
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    token: CancellationToken,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn get_joke(&self, joke_type: &str) -> reqwest::Response {
        self.client
            .get(self.url("/api/joke"))
            .query(&[("type", joke_type)])
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn post_joke(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/joke"))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn put_joke(&self, id: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(&format!("/api/joke/{id}")))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn delete_joke(&self, id: &str) -> reqwest::Response {
        self.client
            .delete(self.url(&format!("/api/joke/{id}")))
            .send()
            .await
            .expect("Failed to send request")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Start a server built from configuration
pub async fn spawn_server(config: ServerConfig) -> TestServer {
    let server = Server::new(config, ShutdownConfig::default())
        .await
        .expect("Failed to create server");
    start(server).await
}

/// Start a server with no providers and the given store
pub async fn spawn_with_store(store: Arc<dyn JokeStore>) -> TestServer {
    spawn_with_config_and_store(ServerConfig::for_testing(), store).await
}

/// Start a server with no providers, the given configuration and store
pub async fn spawn_with_config_and_store(
    config: ServerConfig,
    store: Arc<dyn JokeStore>,
) -> TestServer {
    let server = Server::with_dependencies(
        config,
        ShutdownConfig::default(),
        Arc::new(ProviderRegistry::new()),
        store,
    )
    .expect("Failed to create server");
    start(server).await
}

/// Start a server with no providers and an empty in-memory store
pub async fn spawn_default() -> TestServer {
    spawn_with_store(Arc::new(InMemoryJokeStore::new())).await
}

/// Start a server whose providers talk to the given mock servers
pub async fn spawn_with_providers(chuck_norris: &MockServer, dad_joke: &MockServer) -> TestServer {
    let mut config = ServerConfig::for_testing();
    config.external_apis.chuck_norris = ProviderConfig::for_testing(chuck_norris.uri());
    config.external_apis.dad_joke = ProviderConfig::for_testing(dad_joke.uri());
    spawn_server(config).await
}

/// Testing configuration with both per-client budgets enabled
pub fn rate_limited_config(
    requests_per_minute: u32,
    provider_requests_per_minute: u32,
) -> ServerConfig {
    let mut config = ServerConfig::for_testing();
    config.rate_limiting = RateLimitingConfig {
        enabled: true,
        requests_per_minute,
        provider_requests_per_minute,
    };
    config
}

async fn start(server: Server) -> TestServer {
    let (addr, token) = server
        .run_for_testing()
        .await
        .expect("Failed to start test server");

    TestServer {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        token,
    }
}

/// Mount a working Chuck Norris API
pub async fn mock_chuck_norris(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": ["dev"],
            "created_at": "2020-01-05 13:42:19.324003",
            "icon_url": "https://api.chucknorris.io/img/avatar/chuck-norris.png",
            "id": "elgv2wkvt8ioag6xywykbq",
            "updated_at": "2020-01-05 13:42:19.324003",
            "url": "https://api.chucknorris.io/jokes/elgv2wkvt8ioag6xywykbq",
            "value": CHUCK_NORRIS_JOKE
        })))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/jokes/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["dev", "food"])))
        .mount(mock_server)
        .await;
}

/// Mount a working Dad Joke API
pub async fn mock_dad_joke(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "R7UfaahVfFd",
            "joke": DAD_JOKE,
            "status": 200
        })))
        .mount(mock_server)
        .await;
}

/// Mount a provider answering every request with `status`
pub async fn mock_failing(mock_server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream failure"))
        .mount(mock_server)
        .await;
}

/// Mount a provider answering after the one second test timeout
pub async fn mock_slow(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "slow", "joke": DAD_JOKE, "value": CHUCK_NORRIS_JOKE}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(mock_server)
        .await;
}
