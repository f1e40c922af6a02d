// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Jokes API Server Implementation
//!
//! This crate provides the HTTP server for the jokes API, built with Axum. It serves
//! Chuck Norris facts and dad jokes from external providers, and CRUD over locally
//! authored ("Propio") jokes kept in an injectable joke store.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and their JSON HTTP responses
//! - [`extractors`]: JSON body and query extractors reporting failures as [`ServerError`]
//! - [`state`]: Shared application state and aggregated health
//! - [`server`]: Server construction, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`middleware`]: Per-client rate limiting
//! - [`metrics`]: Prometheus metrics and the `/metrics` endpoint
//! - [`docs`] / [`openapi`]: `OpenAPI` document and Swagger UI
//!
//! # Key Features
//!
//! - **Joke Dispatch**: `GET /api/joke?type=…` routes to the provider or the store by joke type
//! - **Injectable Store**: in-memory or JSON file backend behind `Arc<dyn JokeStore>`
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken`
//! - **Rate Limiting**: IP-based request limiting with configurable requests per minute
//! - **Health Monitoring**: Aggregated health of the store and every joke provider

pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use routes::jokes::JokePayload;
pub use server::{Server, ShutdownConfig};
pub use shared_types::JokeSource;
pub use state::{HealthCheck, ServerState};
