// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! This module provides configuration structures and logic for the jokes API server,
//! supporting different environments and validation of configuration parameters.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File, Map};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ServerError, ServerResult};

const DEFAULT_CHUCK_NORRIS_BASE_URL: &str = "https://api.chucknorris.io";
const DEFAULT_DAD_JOKE_BASE_URL: &str = "https://icanhazdadjoke.com";
const DEFAULT_STORE_PATH: &str = "data/jokes.json";

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Create a safe default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Create a safe testing port (port 0)
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // Re-validated in `ServerConfig::load` once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Create a safe default timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// Default bound for a single provider request (5 seconds)
    pub const fn provider_default() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Default bound for a provider health probe (3 seconds)
    pub const fn health_check_default() -> Self {
        Self(Duration::from_secs(3))
    }

    /// Create a safe testing timeout (5 seconds)
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }

    /// Get the timeout value in whole seconds
    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

/// Per-IP rate limiting for the `/api` routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Whether requests are rate limited at all
    pub enabled: bool,
    /// Store requests allowed per client IP within one minute
    pub requests_per_minute: u32,
    /// Requests per client IP and minute that reach an external provider
    #[serde(default = "default_provider_requests_per_minute")]
    pub provider_requests_per_minute: u32,
}

fn default_provider_requests_per_minute() -> u32 {
    10
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_minute: 60,
            provider_requests_per_minute: default_provider_requests_per_minute(),
        }
    }
}

/// Settings for one external joke provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether the provider is queried; disabled providers answer 503
    pub enabled: bool,
    /// Provider base URL
    pub base_url: String,
    /// Bound for a single joke request
    pub timeout_seconds: TimeoutSeconds,
    /// Bound for a health probe
    pub health_check_timeout_seconds: TimeoutSeconds,
}

impl ProviderConfig {
    fn enabled_at(base_url: &str) -> Self {
        Self {
            enabled: true,
            base_url: base_url.to_string(),
            timeout_seconds: TimeoutSeconds::provider_default(),
            health_check_timeout_seconds: TimeoutSeconds::health_check_default(),
        }
    }

    /// Point the provider at `base_url` with short test timeouts
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            base_url: base_url.into(),
            timeout_seconds: TimeoutSeconds(Duration::from_secs(1)),
            health_check_timeout_seconds: TimeoutSeconds(Duration::from_secs(1)),
        }
    }

    /// A provider that is never queried
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// External joke providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalApisConfig {
    /// chucknorris.io
    pub chuck_norris: ProviderConfig,
    /// icanhazdadjoke.com
    pub dad_joke: ProviderConfig,
}

impl Default for ExternalApisConfig {
    fn default() -> Self {
        Self {
            chuck_norris: ProviderConfig::enabled_at(DEFAULT_CHUCK_NORRIS_BASE_URL),
            dad_joke: ProviderConfig::enabled_at(DEFAULT_DAD_JOKE_BASE_URL),
        }
    }
}

/// Which joke store backend to run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, emptied on restart
    Memory,
    /// JSON file on disk
    File,
}

/// Joke store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    pub backend: StoreBackend,
    /// File used by the `file` backend
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Server configuration for different environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Request timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Rate limiting for the joke routes
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
    /// External joke providers
    #[serde(default)]
    pub external_apis: ExternalApisConfig,
    /// Joke store
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            rate_limiting: RateLimitingConfig::default(),
            external_apis: ExternalApisConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with the `SERVER_` prefix, nested keys joined by `__`
    ///    (e.g. `SERVER_EXTERNAL_APIS__DAD_JOKE__ENABLED=false`)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), None)
    }

    /// Load configuration from the files in `dir`
    ///
    /// When `vars` is given it replaces the process environment, both for
    /// `ENVIRONMENT` and for the `SERVER_` variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load_from(dir: &Path, vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let environment = match &vars {
            Some(vars) => vars.get("ENVIRONMENT").cloned(),
            None => std::env::var("ENVIRONMENT").ok(),
        };
        let env_name = environment
            .as_deref()
            .unwrap_or("development")
            .to_lowercase();

        let mut config_builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .set_default("rate_limiting.enabled", false)?
            .set_default("rate_limiting.requests_per_minute", 60)?
            .set_default(
                "rate_limiting.provider_requests_per_minute",
                default_provider_requests_per_minute(),
            )?
            .set_default("store.backend", "memory")?
            .set_default("store.path", DEFAULT_STORE_PATH)?;

        for (name, base_url) in [
            ("chuck_norris", DEFAULT_CHUCK_NORRIS_BASE_URL),
            ("dad_joke", DEFAULT_DAD_JOKE_BASE_URL),
        ] {
            let key = |field: &str| format!("external_apis.{name}.{field}");
            config_builder = config_builder
                .set_default(key("enabled"), true)?
                .set_default(key("base_url"), base_url)?
                .set_default(key("timeout_seconds"), 5)?
                .set_default(key("health_check_timeout_seconds"), 3)?;
        }

        config_builder = config_builder
            .add_source(File::from(dir.join("config.json")).required(false))
            .add_source(File::from(dir.join(format!("config.{env_name}.json"))).required(false))
            .add_source(
                ConfigEnv::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            );

        if environment.is_some() {
            config_builder = config_builder.set_override("environment", env_name)?;
        }

        let config = config_builder.build()?;
        let mut server_config: Self = config.try_deserialize()?;

        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        Ok(server_config)
    }

    /// Create configuration optimized for testing
    ///
    /// Providers are disabled and the in-memory store is used; tests that need a
    /// provider point it at a mock server through [`ProviderConfig::for_testing`].
    pub fn for_testing() -> Self {
        let external_apis = ExternalApisConfig::default();
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(), // let OS choose available port
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            rate_limiting: RateLimitingConfig::default(),
            external_apis: ExternalApisConfig {
                chuck_norris: external_apis.chuck_norris.disabled(),
                dad_joke: external_apis.dad_joke.disabled(),
            },
            store: StoreConfig::default(),
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}
