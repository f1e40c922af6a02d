// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Health check types and utilities for joke providers

use serde::{Deserialize, Serialize};

/// Health status of a joke provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum HealthStatus {
    /// Service is healthy and operational
    Up,
    /// Service is degraded but still functional
    Degraded { reason: String },
    /// Service is down and not functional
    Down { reason: String },
}

impl HealthStatus {
    /// Classify the HTTP status code returned by a provider health probe
    ///
    /// 2xx is `Up`, 429 and other 4xx are `Degraded`, 5xx is `Down`.
    pub fn from_probe_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Up,
            429 => Self::Degraded {
                reason: "Rate limited".to_string(),
            },
            500..=599 => Self::Down {
                reason: format!("API returned status {status}"),
            },
            _ => Self::Degraded {
                reason: format!("API returned status {status}"),
            },
        }
    }

    /// Check if this health status indicates the service is available
    pub fn is_available(&self) -> bool {
        matches!(self, HealthStatus::Up | HealthStatus::Degraded { .. })
    }

    /// Check if this health status indicates the service is completely down
    pub fn is_down(&self) -> bool {
        matches!(self, HealthStatus::Down { .. })
    }

    /// Get a human-readable description of the status
    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Up => "Service is healthy",
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => reason,
        }
    }
}
