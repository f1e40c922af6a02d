// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider registry for the external joke providers
//!
//! This module routes a joke request to the provider serving the requested
//! [`JokeSource`] and aggregates the providers' health.

use std::collections::HashMap;

use api_client::{ApiError, HealthStatus, JokeProvider, ProviderJoke};
use shared_types::JokeSource;
use tracing::{debug, info, warn};

use crate::{ChuckNorrisClient, DadJokeClient};

/// Registry for managing the external joke providers
#[derive(Debug)]
pub struct ProviderRegistry {
    chuck_norris_client: Option<ChuckNorrisClient>,
    dad_joke_client: Option<DadJokeClient>,
}

/// Error type for registry operations
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum RegistryError {
    /// The provider for this source is not configured
    #[error("Provider for '{joke_source}' jokes is disabled")]
    Disabled { joke_source: JokeSource },

    /// The source is not served by an external provider
    #[error("'{joke_source}' jokes are not served by an external provider")]
    NotExternal { joke_source: JokeSource },

    /// The provider failed to return a joke
    #[error("{provider} failed: {error}")]
    Provider {
        provider: &'static str,
        #[source]
        error: ApiError,
    },
}

impl RegistryError {
    /// Whether the provider did not answer in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Provider { error, .. } if error.is_timeout())
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Create a new empty provider registry
    pub fn new() -> Self {
        Self {
            chuck_norris_client: None,
            dad_joke_client: None,
        }
    }

    /// Create a new provider registry with the specified clients
    pub fn with_clients(
        chuck_norris_client: Option<ChuckNorrisClient>,
        dad_joke_client: Option<DadJokeClient>,
    ) -> Self {
        Self {
            chuck_norris_client,
            dad_joke_client,
        }
    }

    /// Whether a provider is configured for the given source
    pub fn is_enabled(&self, source: JokeSource) -> bool {
        match source {
            JokeSource::Chuck => self.chuck_norris_client.is_some(),
            JokeSource::DadJoke => self.dad_joke_client.is_some(),
            JokeSource::Own => false,
        }
    }

    /// Fetch one joke from the provider serving `source`
    ///
    /// Provider failures are surfaced as-is; there is no fallback to another provider.
    pub async fn fetch_joke(&self, joke_source: JokeSource) -> Result<ProviderJoke, RegistryError> {
        match joke_source {
            JokeSource::Chuck => {
                let client = self
                    .chuck_norris_client
                    .as_ref()
                    .ok_or(RegistryError::Disabled { joke_source })?;
                Self::fetch_from(client).await
            }
            JokeSource::DadJoke => {
                let client = self
                    .dad_joke_client
                    .as_ref()
                    .ok_or(RegistryError::Disabled { joke_source })?;
                Self::fetch_from(client).await
            }
            JokeSource::Own => Err(RegistryError::NotExternal { joke_source }),
        }
    }

    async fn fetch_from<P: JokeProvider>(client: &P) -> Result<ProviderJoke, RegistryError> {
        debug!(provider = client.name(), "dispatching joke request");
        match client.fetch_joke().await {
            Ok(joke) => {
                info!(
                    provider = client.name(),
                    joke_id = %joke.id,
                    "retrieved joke from provider"
                );
                Ok(joke)
            }
            Err(error) => {
                warn!(provider = client.name(), %error, "provider failed");
                Err(RegistryError::Provider {
                    provider: client.name(),
                    error,
                })
            }
        }
    }

    /// Get the health status of all configured providers
    pub async fn get_overall_health(&self) -> HashMap<String, HealthStatus> {
        let (chuck_norris, dad_joke) = tokio::join!(
            Self::probe(self.chuck_norris_client.as_ref()),
            Self::probe(self.dad_joke_client.as_ref()),
        );

        chuck_norris.into_iter().chain(dad_joke).collect()
    }

    async fn probe<P: JokeProvider>(client: Option<&P>) -> Option<(String, HealthStatus)> {
        let client = client?;
        let status = match client.health_check().await {
            Ok(status) => status,
            Err(e) => {
                warn!(provider = client.name(), "health check failed: {}", e);
                HealthStatus::Down {
                    reason: format!("Health check failed: {e}"),
                }
            }
        };
        Some((client.name().to_string(), status))
    }

    /// Get the list of configured provider names
    pub fn get_client_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if let Some(client) = &self.chuck_norris_client {
            names.push(client.name());
        }
        if let Some(client) = &self.dad_joke_client {
            names.push(client.name());
        }
        names
    }

    /// Check if any providers are configured
    pub fn has_clients(&self) -> bool {
        self.chuck_norris_client.is_some() || self.dad_joke_client.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChuckNorrisConfig, DadJokeConfig};

    #[test]
    fn empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(!registry.has_clients());
        assert!(registry.get_client_names().is_empty());
        assert!(!registry.is_enabled(JokeSource::Chuck));
    }

    #[test]
    fn registry_with_clients() {
        let registry = ProviderRegistry::with_clients(
            Some(ChuckNorrisClient::new(ChuckNorrisConfig::default()).unwrap()),
            Some(DadJokeClient::new(DadJokeConfig::default()).unwrap()),
        );

        assert!(registry.has_clients());
        assert_eq!(registry.get_client_names(), vec!["chuck_norris", "dad_joke"]);
        assert!(registry.is_enabled(JokeSource::Chuck));
        assert!(registry.is_enabled(JokeSource::DadJoke));
        assert!(!registry.is_enabled(JokeSource::Own));
    }

    #[tokio::test]
    async fn disabled_provider_is_reported() {
        let registry = ProviderRegistry::new();
        let err = registry.fetch_joke(JokeSource::DadJoke).await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Disabled {
                joke_source: JokeSource::DadJoke
            }
        ));
    }

    #[tokio::test]
    async fn own_jokes_are_not_external() {
        let registry = ProviderRegistry::new();
        let err = registry.fetch_joke(JokeSource::Own).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotExternal { .. }));
    }

    #[tokio::test]
    async fn empty_registry_health_is_empty() {
        let registry = ProviderRegistry::new();
        assert!(registry.get_overall_health().await.is_empty());
    }
}
