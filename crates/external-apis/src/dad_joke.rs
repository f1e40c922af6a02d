// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dad Joke API integration
//!
//! This module provides an implementation of the `JokeProvider` trait for the
//! icanhazdadjoke.com API. The root endpoint returns a random joke as JSON when
//! asked for `application/json`.

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

const DEFAULT_DAD_JOKE_BASE_URL: &str = "https://icanhazdadjoke.com";

/// Configuration for the Dad Joke API client
#[derive(Debug, Clone)]
pub struct DadJokeConfig {
    /// Base URL for the Dad Joke API
    pub base_url: NonEmptyString,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl DadJokeConfig {
    /// Create a new `DadJokeConfig` with validation
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

impl Default for DadJokeConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self {
            base_url: NonEmptyString::new(DEFAULT_DAD_JOKE_BASE_URL)
                .expect("known to be non-empty"),
            timeout_seconds: DEFAULT_PROVIDER_TIMEOUT_SECONDS,
            health_check_timeout_seconds: DEFAULT_HEALTH_CHECK_TIMEOUT_SECONDS,
        }
    }
}

/// Dad Joke API client implementation
#[derive(Debug)]
pub struct DadJokeClient {
    client: Client,
    base_url: String,
    config: DadJokeConfig,
}

/// Errors specific to the Dad Joke API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DadJokeError {
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

impl From<DadJokeError> for ApiError {
    fn from(value: DadJokeError) -> Self {
        match value {
            DadJokeError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            DadJokeError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            DadJokeError::EmptyJoke => ApiError::InvalidResponse {
                message: value.to_string(),
            },
            DadJokeError::ApiError { status, message } if status == 503 => {
                ApiError::ServiceUnavailable { message }
            }
            DadJokeError::ApiError { status, message } => ApiError::Custom {
                error: anyhow::Error::msg(format!("{status}: {message}")),
            },
            DadJokeError::RateLimited => ApiError::RateLimitExceeded {
                retry_after_seconds: 60,
            },
            DadJokeError::Config(message) => ApiError::Configuration { message },
            DadJokeError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// Response structure for the random joke endpoint
#[derive(Debug, Deserialize)]
pub struct DadJokeResponse {
    /// Joke identifier
    pub id: String,
    /// Joke content
    pub joke: String,
    /// Status code echoed in the body
    pub status: Option<u16>,
}

impl DadJokeClient {
    /// Create a new Dad Joke API client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed or the HTTP client cannot be created
    pub fn new(config: DadJokeConfig) -> Result<Self, DadJokeError> {
        let base_url = normalize_base_url(&config.base_url).map_err(DadJokeError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .build()
            .map_err(DadJokeError::Http)?;

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
    pub async fn get_random_joke(&self) -> Result<DadJokeResponse, DadJokeError> {
        let url = format!("{}/", self.base_url);
        let seconds = self.config.timeout_seconds;

        debug!(url, "fetching random joke from Dad Joke API");

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
                    let joke: DadJokeResponse = serde_json::from_slice(&bytes)?;
                    Ok::<_, DadJokeError>(joke)
                }
                StatusCode::TOO_MANY_REQUESTS => Err(DadJokeError::RateLimited),
                status => {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    warn!("Dad Joke API error: {} - {}", status.as_u16(), error_text);
                    Err(DadJokeError::ApiError {
                        status: status.as_u16(),
                        message: error_text,
                    })
                }
            }
        };

        let joke = timeout(Duration::from_secs(seconds), request)
            .await
            .map_err(|_| DadJokeError::Timeout { seconds })?
            .map_err(|e| match e {
                DadJokeError::Http(ref inner) if inner.is_timeout() => {
                    DadJokeError::Timeout { seconds }
                }
                other => other,
            })?;

        if joke.joke.trim().is_empty() {
            return Err(DadJokeError::EmptyJoke);
        }

        Ok(joke)
    }

    /// Convert a provider response into the normalized joke shape
    fn convert_response(&self, response: DadJokeResponse) -> ProviderJoke {
        let url = format!("{}/j/{}", self.base_url, response.id);
        ProviderJoke::new(JokeSource::DadJoke, response.id, response.joke).with_url(url)
    }
}

impl JokeProvider for DadJokeClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}/", self.base_url);

        debug!(url, "performing health check on Dad Joke API");

        let start_time = Instant::now();
        let response = timeout(
            Duration::from_secs(self.config.health_check_timeout_seconds),
            self.client
                .get(&url)
                .header("accept", "application/json")
                .send(),
        )
        .await
        .map_err(|_| DadJokeError::Timeout {
            seconds: self.config.health_check_timeout_seconds,
        })?
        .map_err(DadJokeError::Http)?;

        let status = HealthStatus::from_probe_status(response.status().as_u16());
        if status == HealthStatus::Up {
            info!(
                "Dad Joke API health check passed in {:?}",
                start_time.elapsed()
            );
        } else {
            warn!("Dad Joke API health check failed: {}", status.description());
        }
        Ok(status)
    }

    async fn fetch_joke(&self) -> Result<ProviderJoke, ApiError> {
        let response = self.get_random_joke().await.map_err(|e| {
            warn!("failed to fetch joke from Dad Joke API: {}", e);
            e
        })?;

        debug!(joke_id = %response.id, "received joke from Dad Joke API");
        Ok(self.convert_response(response))
    }

    fn name(&self) -> &'static str {
        "dad_joke"
    }

    fn source(&self) -> JokeSource {
        JokeSource::DadJoke
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_success() {
        assert!(DadJokeClient::new(DadJokeConfig::default()).is_ok());
    }

    #[test]
    fn client_creation_invalid_url() {
        let config = DadJokeConfig::new("icanhazdadjoke", 5, 3).unwrap();
        assert!(matches!(
            DadJokeClient::new(config).unwrap_err(),
            DadJokeError::Config(_)
        ));
    }

    #[test]
    fn convert_response_builds_permalink() {
        let client = DadJokeClient::new(DadJokeConfig::default()).unwrap();
        let joke = client.convert_response(DadJokeResponse {
            id: "R7UfaahVfFd".to_string(),
            joke: "I'm reading a book about anti-gravity. It's impossible to put down.".to_string(),
            status: Some(200),
        });

        assert_eq!(joke.source, JokeSource::DadJoke);
        assert_eq!(joke.id, "R7UfaahVfFd");
        assert_eq!(
            joke.url.as_deref(),
            Some("https://icanhazdadjoke.com/j/R7UfaahVfFd")
        );
        assert!(joke.categories.is_empty());
    }

    #[test]
    fn service_unavailable_is_classified() {
        let err = ApiError::from(DadJokeError::ApiError {
            status: 503,
            message: "maintenance".to_string(),
        });
        assert!(matches!(err, ApiError::ServiceUnavailable { .. }));

        let err = ApiError::from(DadJokeError::ApiError {
            status: 500,
            message: "boom".to_string(),
        });
        assert!(matches!(err, ApiError::Custom { .. }));
    }
}
