// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Operational handlers

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::state::{HealthCheck, HealthStatus, ServerState};

/// Health check endpoint handler
///
/// Answers 503 only when the service is down; a degraded provider still reports 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns the current health status of the service including version, environment, the joke store and every configured joke provider (Chuck Norris, Dad Joke).",
    responses(
        (status = 200, description = "Service is up or degraded", body = HealthCheck),
        (status = 503, description = "Service unavailable", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health = state.health_check().await;
    let status = if matches!(health.status, HealthStatus::Down { .. }) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (status, Json(health))
}
