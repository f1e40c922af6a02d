// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Joke source identifiers
//!
//! The `type` query parameter of the joke endpoint selects one of a closed set of
//! sources. Parsing is exact and case-sensitive so the wire names stay stable.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a joke comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum JokeSource {
    /// Chuck Norris facts from the external provider
    #[serde(rename = "Chuck")]
    Chuck,
    /// Dad jokes from the external provider
    #[serde(rename = "Dad Joke")]
    DadJoke,
    /// Jokes authored locally and kept in the joke store
    #[serde(rename = "Propio")]
    Own,
}

impl JokeSource {
    /// Returns the name used on the wire (query parameter and response tag)
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Chuck => "Chuck",
            Self::DadJoke => "Dad Joke",
            Self::Own => "Propio",
        }
    }

    /// Returns a lowercase identifier suitable for log fields and metric labels
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chuck => "chuck_norris",
            Self::DadJoke => "dad_joke",
            Self::Own => "own",
        }
    }

    /// Returns whether jokes of this source are fetched from an external provider
    pub const fn is_external(self) -> bool {
        matches!(self, Self::Chuck | Self::DadJoke)
    }

    /// Returns all joke sources
    pub const fn all() -> &'static [Self] {
        &[Self::Chuck, Self::DadJoke, Self::Own]
    }
}

impl fmt::Display for JokeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for JokeSource {
    type Err = JokeSourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Chuck" => Ok(Self::Chuck),
            "Dad Joke" => Ok(Self::DadJoke),
            "Propio" => Ok(Self::Own),
            _ => Err(JokeSourceParseError(s.to_string())),
        }
    }
}

/// Error returned when a string does not name a known joke source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported joke type: '{0}'. Supported types are: Chuck, Dad Joke, Propio")]
pub struct JokeSourceParseError(pub String);
