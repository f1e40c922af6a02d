// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration for the jokes API server.

pub mod handlers;
pub mod jokes;

use axum::{Router, middleware, routing::get};
use handlers::health_handler;

use crate::{
    metrics::metrics_handler,
    middleware::{RateLimiter, rate_limiting_middleware},
    openapi::{OPENAPI_PATH, openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes with conditional rate limiting
#[allow(clippy::needless_pass_by_value)] // We need to clone the rate limiter for middleware
pub fn create_routes(rate_limiter: RateLimiter) -> Router<ServerState> {
    // Operational endpoints are not rate limited
    let ops_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route(OPENAPI_PATH, get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let mut api_routes = jokes::joke_routes();

    if rate_limiter.is_enabled() {
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            rate_limiter.clone(),
            rate_limiting_middleware,
        ));
    }

    Router::new()
        .merge(ops_routes)
        .merge(docs_routes)
        .nest("/api", api_routes)
}
