// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Generic joke provider traits and utilities for external integrations
//!
//! This crate provides common abstractions for external joke providers, so the
//! server can treat the Chuck Norris and Dad Joke services uniformly.
//!
//! # Core Abstractions
//!
//! - **`JokeProvider` Trait**: Common interface for all external joke providers
//! - **Health Check System**: Standardized health status reporting across providers
//! - **Error Handling**: `ApiError` types for the different upstream failure modes
//! - **Data Types**: [`ProviderJoke`], the normalized shape of an external joke

use shared_types::JokeSource;
use thiserror::Error;

pub mod health;
pub mod types;

pub use health::*;
pub use types::*;

/// Generic trait for external joke providers
///
/// Each provider returns exactly one joke per call.
pub trait JokeProvider: Send + Sync {
    /// Check the health of this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the health check request itself cannot be performed
    fn health_check(&self) -> impl Future<Output = Result<HealthStatus, ApiError>> + Send;

    /// Fetch a single joke from the provider
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, times out, is rate limited, or the
    /// provider answers with a body that cannot be understood
    fn fetch_joke(&self) -> impl Future<Output = Result<ProviderJoke, ApiError>> + Send;

    /// Get the name/identifier of this provider
    fn name(&self) -> &'static str;

    /// Joke source served by this provider
    fn source(&self) -> JokeSource;
}

/// Common errors that can occur when talking to a joke provider
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// Invalid response format
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Service unavailable
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network timeout
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Client independent error
    #[error(transparent)]
    Custom { error: anyhow::Error },
}

impl ApiError {
    /// Whether the error was caused by the provider not answering in time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
