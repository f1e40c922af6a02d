// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the jokes API server: the
//! configuration, the provider registry, the injected joke store and the
//! cancellation token used for coordinated shutdown.

use std::{collections::HashMap, fmt, sync::Arc};

use external_apis::ProviderRegistry;
use joke_store::JokeStore;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Registry of external joke providers
    providers: Arc<ProviderRegistry>,
    /// Store for locally authored jokes
    store: Arc<dyn JokeStore>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl fmt::Debug for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("providers", &self.providers)
            .field("store", &self.store.backend())
            .field("cancellation_token", &self.cancellation_token)
            .finish()
    }
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        providers: Arc<ProviderRegistry>,
        store: Arc<dyn JokeStore>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            providers,
            store,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registry of external joke providers
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Store for locally authored jokes
    pub fn store(&self) -> &dyn JokeStore {
        self.store.as_ref()
    }

    /// Aggregate the health of the store and every configured provider
    ///
    /// A failing store makes the service `Down`; an unhealthy provider only
    /// degrades it, since the other joke types keep working.
    pub async fn health_check(&self) -> HealthCheck {
        let (provider_health, store_len) =
            tokio::join!(self.providers.get_overall_health(), self.store.len());

        let api_clients: HashMap<String, HealthStatus> = provider_health
            .into_iter()
            .map(|(name, status)| (name, Self::convert_health_status(status)))
            .collect();

        let store = match store_len {
            Ok(jokes) => StoreHealth {
                backend: self.store.backend(),
                status: HealthStatus::Up,
                jokes: Some(jokes),
            },
            Err(e) => {
                warn!(error = %e, "joke store health check failed");
                StoreHealth {
                    backend: self.store.backend(),
                    status: HealthStatus::Down {
                        reason: e.to_string().into_boxed_str(),
                    },
                    jokes: None,
                }
            }
        };

        let unhealthy: Vec<&str> = api_clients
            .iter()
            .filter(|(_, status)| **status != HealthStatus::Up)
            .map(|(name, _)| name.as_str())
            .collect();

        let status = if store.status != HealthStatus::Up {
            HealthStatus::Down {
                reason: Box::from("joke store unavailable"),
            }
        } else if unhealthy.is_empty() {
            HealthStatus::Up
        } else {
            HealthStatus::Degraded {
                reason: format!("unhealthy providers: {}", unhealthy.join(", ")).into_boxed_str(),
            }
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            api_clients,
            store,
        }
    }

    /// Convert external API health status to internal health status
    fn convert_health_status(external_status: api_client::HealthStatus) -> HealthStatus {
        match external_status {
            api_client::HealthStatus::Up => HealthStatus::Up,
            api_client::HealthStatus::Degraded { reason } => HealthStatus::Degraded {
                reason: reason.into_boxed_str(),
            },
            api_client::HealthStatus::Down { reason } => HealthStatus::Down {
                reason: reason.into_boxed_str(),
            },
        }
    }
}

/// Health status of a service or dependency
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is not operational or has critical failures
    Down {
        /// Human-readable explanation of why the service is down
        reason: Box<str>,
    },

    /// Service is operational but experiencing performance issues or partial failures
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

/// Health of the joke store
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreHealth {
    /// Backend name
    pub backend: &'static str,
    /// Store status
    pub status: HealthStatus,
    /// Number of stored jokes, when the store could be read
    pub jokes: Option<usize>,
}

/// Health check status
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Status of individual joke providers
    #[schema(value_type = Object)]
    pub api_clients: HashMap<String, HealthStatus>,
    /// Status of the joke store
    pub store: StoreHealth,
}

#[cfg(test)]
mod tests {
    use joke_store::{InMemoryJokeStore, MockJokeStore, NewJoke, StoreError};

    use super::*;

    fn state_with(store: Arc<dyn JokeStore>, token: CancellationToken) -> ServerState {
        ServerState::new(
            ServerConfig::for_testing(),
            Arc::new(ProviderRegistry::new()),
            store,
            token,
        )
    }

    #[test]
    fn server_state_with_cancellation_token() {
        let token = CancellationToken::new();
        let state = state_with(Arc::new(InMemoryJokeStore::new()), token.clone());

        assert!(!state.cancellation_token.is_cancelled());

        token.cancel();
        assert!(state.cancellation_token.is_cancelled());
    }

    #[tokio::test]
    async fn healthy_store_without_providers_is_up() {
        let store = Arc::new(InMemoryJokeStore::new());
        store.create(NewJoke::new("uno")).await.unwrap();
        let state = state_with(store, CancellationToken::new());

        let health = state.health_check().await;
        assert_eq!(health.status, HealthStatus::Up);
        assert_eq!(health.environment, Environment::Testing);
        assert_eq!(health.store.jokes, Some(1));
        assert_eq!(health.store.backend, "memory");
        assert!(health.api_clients.is_empty());
    }

    #[tokio::test]
    async fn failing_store_is_down() {
        let mut store = MockJokeStore::new();
        store
            .expect_len()
            .returning(|| Err(StoreError::Io(std::io::Error::other("disk gone"))));
        store.expect_backend().return_const("mock");
        let state = state_with(Arc::new(store), CancellationToken::new());

        let health = state.health_check().await;
        assert!(matches!(health.status, HealthStatus::Down { .. }));
        assert!(health.store.jokes.is_none());
    }
}
