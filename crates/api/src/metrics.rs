// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros, a
//! middleware recording every HTTP request and an Axum-compatible metrics handler.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{MatchedPath, Request},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, TextEncoder, register_histogram_vec,
    register_int_counter_vec,
};
use shared_types::JokeSource;
use tracing::error;

/// Total number of HTTP requests, labeled by method, matched route and status.
pub static HTTP_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "jokes_api_http_requests_total",
        "Total number of HTTP requests",
        &["method", "route", "status"]
    )
    .expect("Failed to create jokes_api_http_requests_total counter vec")
});

/// Histogram for HTTP request durations in seconds.
pub static HTTP_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "jokes_api_http_request_duration_seconds",
        "HTTP request durations in seconds",
        &["method", "route"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create HTTP request duration histogram")
});

/// Jokes served by the dispatcher, labeled by joke type.
pub static JOKES_SERVED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "jokes_api_jokes_served_total",
        "Total number of jokes served, labeled by source",
        &["source"]
    )
    .expect("Failed to create jokes_api_jokes_served_total counter vec")
});

/// Histogram for external provider request durations in seconds.
pub static PROVIDER_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "jokes_api_provider_request_duration_seconds",
        "External joke provider request durations in seconds",
        &["source", "result"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create provider request duration histogram")
});

/// Store operations, labeled by operation and outcome.
pub static STORE_OPERATIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "jokes_api_store_operations_total",
        "Total number of joke store operations",
        &["operation", "result"]
    )
    .expect("Failed to create store operations counter vec")
});

/// Count one joke served for `source`
pub fn inc_jokes_served(source: JokeSource) {
    JOKES_SERVED.with_label_values(&[source.label()]).inc();
}

/// Observe the duration of a provider request
///
/// # Arguments
/// * `source` - The joke type that was requested
/// * `result` - `ok`, `error` or `timeout`
/// * `duration_secs` - The duration of the request in seconds
pub fn observe_provider_duration(source: JokeSource, result: &str, duration_secs: f64) {
    PROVIDER_REQUEST_DURATION
        .with_label_values(&[source.label(), result])
        .observe(duration_secs);
}

/// Record a store operation outcome
pub fn record_store_operation(operation: &str, success: bool) {
    let result = if success { "ok" } else { "error" };
    STORE_OPERATIONS
        .with_label_values(&[operation, result])
        .inc();
}

/// Middleware recording request counts and durations per matched route
pub async fn http_metrics_middleware(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |path| path.as_str().to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    HTTP_REQUEST_DURATION
        .with_label_values(&[method.as_str(), route.as_str()])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS
        .with_label_values(&[method.as_str(), route.as_str(), response.status().as_str()])
        .inc();

    response
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
