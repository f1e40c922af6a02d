// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the jokes API service
//!
//! This crate provides common types that are shared across multiple crates
//! in the jokes API workspace, avoiding circular dependencies.

pub mod joke_source;

pub use joke_source::{JokeSource, JokeSourceParseError};
