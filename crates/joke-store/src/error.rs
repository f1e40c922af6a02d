// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for joke storage

use thiserror::Error;

use crate::JokeId;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or mutating the joke store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No joke is stored under the given id
    #[error("joke {0} not found")]
    NotFound(JokeId),

    /// The joke payload failed validation
    #[error("invalid joke: {0}")]
    Validation(String),

    /// Backing file could not be read or written
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file holds data that cannot be (de)serialized
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

