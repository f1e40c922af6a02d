// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! External API integrations for joke providers
//!
//! This crate provides implementations of the `JokeProvider` trait for the external
//! services the jokes API proxies, along with a registry that dispatches requests to
//! the provider matching a [`shared_types::JokeSource`].
//!
//! # Architecture
//!
//! - **Client Implementations**: [`chuck_norris`], [`dad_joke`] - specific API integrations
//! - **Registry Pattern**: [`registry::ProviderRegistry`] - dispatches by joke source
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] - ensures non-empty string constraints
//!
//! # Features
//!
//! - **Bounded Latency**: Every upstream call is wrapped in a timeout (5 seconds by default)
//! - **Concurrent Health Checks**: Uses `tokio::join!` for efficient health monitoring
//! - **Robust Error Handling**: Provider errors map onto the shared `ApiError` taxonomy
//! - **Testing Support**: Test coverage using wiremock for HTTP simulation

pub mod chuck_norris;
pub mod dad_joke;
pub mod non_empty_string;
pub mod registry;

pub use chuck_norris::*;
pub use dad_joke::*;
pub use non_empty_string::NonEmptyString;
pub use registry::*;

/// User agent sent to every provider
pub(crate) const USER_AGENT: &str = concat!(
    "jokes-api/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/semiotic-ai/jokes-api)"
);

/// Default bound for a single provider request
pub const DEFAULT_PROVIDER_TIMEOUT_SECONDS: u64 = 5;

/// Default bound for a provider health probe
pub const DEFAULT_HEALTH_CHECK_TIMEOUT_SECONDS: u64 = 3;

/// Validate a provider base URL, returning it without a trailing slash
pub(crate) fn normalize_base_url(base_url: &NonEmptyString) -> Result<String, String> {
    let trimmed = base_url.as_str().trim();
    url::Url::parse(trimmed).map_err(|e| format!("invalid base URL '{trimmed}': {e}"))?;
    Ok(trimmed.trim_end_matches('/').to_string())
}
