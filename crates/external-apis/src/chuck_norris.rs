// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chuck Norris API integration
//!
//! This module provides an implementation of the `JokeProvider` trait for the
//! chucknorris.io API, which serves one random Chuck Norris fact per request.

use std::time::{Duration, Instant};

use api_client::{ApiError, HealthStatus, JokeProvider, ProviderJoke};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared_types::JokeSource;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    DEFAULT_HEALTH_CHECK_TIMEOUT_SECONDS, DEFAULT_PROVIDER_TIMEOUT_SECONDS, USER_AGENT,
    non_empty_string::NonEmptyString, normalize_base_url,
};

const DEFAULT_CHUCK_NORRIS_BASE_URL: &str = "https://api.chucknorris.io";

/// Configuration for the Chuck Norris API client
/// This type is always valid by construction.
#[derive(Debug, Clone)]
pub struct ChuckNorrisConfig {
    /// Base URL for the Chuck Norris API
    pub base_url: NonEmptyString,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl ChuckNorrisConfig {
    /// Create a new `ChuckNorrisConfig` with validation
    pub fn new(
        base_url: impl Into<String>,
        timeout_seconds: u64,
        health_check_timeout_seconds: u64,
    ) -> Result<Self, String> {
        if timeout_seconds == 0 || health_check_timeout_seconds == 0 {
            return Err("timeouts must be greater than 0".to_string());
        }

        Ok(Self {
            base_url: NonEmptyString::new(base_url)?,
            timeout_seconds,
            health_check_timeout_seconds,
        })
    }
}

impl Default for ChuckNorrisConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: NonEmptyString::new(DEFAULT_CHUCK_NORRIS_BASE_URL)
                .expect("known to be non-empty"),
            timeout_seconds: DEFAULT_PROVIDER_TIMEOUT_SECONDS,
            health_check_timeout_seconds: DEFAULT_HEALTH_CHECK_TIMEOUT_SECONDS,
        }
    }
}

/// Chuck Norris API client implementation
#[derive(Debug)]
pub struct ChuckNorrisClient {
    client: Client,
    base_url: String,
    config: ChuckNorrisConfig,
}

/// Errors specific to the Chuck Norris API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ChuckNorrisError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The provider answered with an empty joke
    #[error("Provider returned an empty joke")]
    EmptyJoke,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<ChuckNorrisError> for ApiError {
    fn from(value: ChuckNorrisError) -> Self {
        match value {
            ChuckNorrisError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            ChuckNorrisError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            ChuckNorrisError::EmptyJoke => ApiError::InvalidResponse {
                message: value.to_string(),
            },
            ChuckNorrisError::ApiError { status, message } => ApiError::Custom {
                error: anyhow::Error::msg(format!("{status}: {message}")),
            },
            ChuckNorrisError::RateLimited => ApiError::RateLimitExceeded {
                retry_after_seconds: 1,
            },
            ChuckNorrisError::Config(message) => ApiError::Configuration { message },
            ChuckNorrisError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// Response structure for the `/jokes/random` endpoint
#[derive(Debug, Deserialize)]
pub struct ChuckNorrisJokeResponse {
    /// Joke identifier
    pub id: String,
    /// Joke content
    pub value: String,
    /// Canonical URL of the joke
    pub url: Option<String>,
    /// Icon shown next to the joke
    pub icon_url: Option<String>,
    /// Categories the joke belongs to
    #[serde(default)]
    pub categories: Vec<String>,
}

impl ChuckNorrisClient {
    /// Create a new Chuck Norris API client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed or the HTTP client cannot be created
    pub fn new(config: ChuckNorrisConfig) -> Result<Self, ChuckNorrisError> {
        let base_url = normalize_base_url(&config.base_url).map_err(ChuckNorrisError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(ChuckNorrisError::Http)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Fetch a random joke from the provider
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, or the body is malformed
    pub async fn get_random_joke(&self) -> Result<ChuckNorrisJokeResponse, ChuckNorrisError> {
        let url = format!("{}/jokes/random", self.base_url);
        let seconds = self.config.timeout_seconds;

        debug!(url, "fetching random joke from Chuck Norris API");

        let request = async {
            let response = self
                .client
                .get(&url)
                .header("accept", "application/json")
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => {
                    let bytes = response.bytes().await?;
                    let joke: ChuckNorrisJokeResponse = serde_json::from_slice(&bytes)?;
                    Ok::<_, ChuckNorrisError>(joke)
                }
                StatusCode::TOO_MANY_REQUESTS => Err(ChuckNorrisError::RateLimited),
                status => {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    warn!(
                        "Chuck Norris API error: {} - {}",
                        status.as_u16(),
                        error_text
                    );
                    Err(ChuckNorrisError::ApiError {
                        status: status.as_u16(),
                        message: error_text,
                    })
                }
            }
        };

        let joke = timeout(Duration::from_secs(seconds), request)
            .await
            .map_err(|_| ChuckNorrisError::Timeout { seconds })?
            .map_err(|e| match e {
                ChuckNorrisError::Http(ref inner) if inner.is_timeout() => {
                    ChuckNorrisError::Timeout { seconds }
                }
                other => other,
            })?;

        if joke.value.trim().is_empty() {
            return Err(ChuckNorrisError::EmptyJoke);
        }

        Ok(joke)
    }
}

impl From<ChuckNorrisJokeResponse> for ProviderJoke {
    fn from(response: ChuckNorrisJokeResponse) -> Self {
        Self {
            source: JokeSource::Chuck,
            id: response.id,
            text: response.value,
            url: response.url,
            icon_url: response.icon_url,
            categories: response.categories,
        }
    }
}

impl JokeProvider for ChuckNorrisClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        // The categories listing is small and does not count as a joke fetch
        let url = format!("{}/jokes/categories", self.base_url);

        debug!(url, "performing health check on Chuck Norris API");

        let start_time = Instant::now();
        let response = timeout(
            Duration::from_secs(self.config.health_check_timeout_seconds),
            self.client
                .get(&url)
                .header("accept", "application/json")
                .send(),
        )
        .await
        .map_err(|_| ChuckNorrisError::Timeout {
            seconds: self.config.health_check_timeout_seconds,
        })?
        .map_err(ChuckNorrisError::Http)?;

        let status = HealthStatus::from_probe_status(response.status().as_u16());
        if status == HealthStatus::Up {
            info!(
                "Chuck Norris API health check passed in {:?}",
                start_time.elapsed()
            );
        } else {
            warn!(
                "Chuck Norris API health check failed: {}",
                status.description()
            );
        }
        Ok(status)
    }

    async fn fetch_joke(&self) -> Result<ProviderJoke, ApiError> {
        let joke = self.get_random_joke().await.map_err(|e| {
            warn!("failed to fetch joke from Chuck Norris API: {}", e);
            e
        })?;

        debug!(joke_id = %joke.id, "received joke from Chuck Norris API");
        Ok(joke.into())
    }

    fn name(&self) -> &'static str {
        "chuck_norris"
    }

    fn source(&self) -> JokeSource {
        JokeSource::Chuck
    }
}
