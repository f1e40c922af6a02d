// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides the error types for server operations and maps every one of
//! them onto an HTTP status with a JSON body of the form
//! `{"error": <kind>, "message": <text>, "status": <code>}`.

use std::net::SocketAddr;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use external_apis::RegistryError;
use joke_store::StoreError;
use serde::Serialize;
use shared_types::JokeSource;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Message returned when a joke id is unknown
pub const JOKE_NOT_FOUND: &str = "Chiste no encontrado";

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Task join errors for async operations
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// Timeout errors for operations that exceed time limits
    #[error("Operation timed out after {timeout_seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        timeout_seconds: u64,
    },

    /// A query or path parameter is missing or has an unsupported value
    #[error("{message}")]
    InvalidParameter {
        /// Error message
        message: String,
    },

    /// Input validation errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// The store refused an operation that reports failures as a bad request
    #[error("{message}")]
    Rejected {
        /// Error message
        message: String,
    },

    /// The requested resource does not exist
    #[error("{message}")]
    NotFound {
        /// Error message
        message: String,
    },

    /// An external provider failed to deliver a joke
    #[error("{provider} failed: {message}")]
    Upstream {
        /// Provider name
        provider: &'static str,
        /// Failure description
        message: String,
    },

    /// An external provider did not answer in time
    #[error("{provider} did not answer in time")]
    UpstreamTimeout {
        /// Provider name
        provider: &'static str,
    },

    /// The provider for this joke type is disabled in configuration
    #[error("Provider for '{joke_source}' jokes is disabled")]
    ProviderDisabled {
        /// Requested joke type
        joke_source: JokeSource,
    },

    /// Too many requests from one client
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Seconds until the client may retry
        retry_after_seconds: u64,
    },

    /// Unexpected failure while serving a request
    #[error("{message}")]
    Internal {
        /// Error message
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine readable error kind
    #[schema(example = "not_found")]
    pub error: &'static str,
    /// Human readable description
    #[schema(example = "Chiste no encontrado")]
    pub message: String,
    /// HTTP status code
    #[schema(example = 404)]
    pub status: u16,
}

impl ServerError {
    /// Unknown joke id
    pub fn joke_not_found() -> Self {
        Self::NotFound {
            message: JOKE_NOT_FOUND.to_string(),
        }
    }

    /// Store failure on an operation that reports failures as 400
    pub fn rejected(context: &str, err: &StoreError) -> Self {
        Self::Rejected {
            message: format!("{context}: {err}"),
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::TaskJoin { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            Self::InvalidParameter { .. }
            | Self::ValidationError(..)
            | Self::JsonError { .. }
            | Self::Rejected { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::ProviderDisabled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Machine readable kind reported in the `error` field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::TaskJoin { .. } => "server_error",
            Self::Internal { .. } => "internal_error",
            Self::Timeout { .. } => "request_timeout",
            Self::InvalidParameter { .. } => "invalid_parameter",
            Self::ValidationError(..) => "validation_error",
            Self::JsonError { .. } => "invalid_json",
            Self::Rejected { .. } => "rejected",
            Self::NotFound { .. } => "not_found",
            Self::Upstream { .. } => "upstream_failure",
            Self::UpstreamTimeout { .. } => "upstream_timeout",
            Self::ProviderDisabled { .. } => "provider_disabled",
            Self::RateLimited { .. } => "rate_limited",
        }
    }

    /// JSON body for this error
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            status: self.status_code().as_u16(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), error = %self, "request failed");
        } else {
            debug!(kind = self.kind(), error = %self, "request rejected");
        }

        let mut response = (status, Json(self.body())).into_response();
        if let Self::RateLimited {
            retry_after_seconds,
        } = self
        {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_seconds));
        }
        response
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}

impl From<RegistryError> for ServerError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Disabled { joke_source } => Self::ProviderDisabled { joke_source },
            RegistryError::NotExternal { .. } => Self::Internal {
                message: err.to_string(),
            },
            RegistryError::Provider { provider, error } if error.is_timeout() => {
                Self::UpstreamTimeout { provider }
            }
            RegistryError::Provider { provider, error } => Self::Upstream {
                provider,
                message: error.to_string(),
            },
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::joke_not_found(),
            StoreError::Validation(message) => Self::ValidationError(message),
            StoreError::Io(_) | StoreError::Serialization(_) => Self::Internal {
                message: format!("Error en el almacenamiento de chistes: {err}"),
            },
        }
    }
}
