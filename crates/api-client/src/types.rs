// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Common data types returned by joke providers

use serde::Serialize;
use shared_types::JokeSource;
use utoipa::ToSchema;

/// A joke fetched from an external provider, normalized across providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProviderJoke {
    /// Provider that produced the joke; carried as the response tag
    #[serde(skip)]
    pub source: JokeSource,
    /// Identifier assigned by the provider
    #[schema(example = "R7UfaahVfFd")]
    pub id: String,
    /// Joke content
    #[schema(example = "My dog used to chase people on a bike a lot. It got so bad I had to take his bike away.")]
    pub text: String,
    /// Canonical URL of the joke, if the provider exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Icon associated with the joke, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Provider categories (empty when the provider has none)
    pub categories: Vec<String>,
}

impl ProviderJoke {
    /// Create a joke with only the mandatory fields set
    pub fn new(source: JokeSource, id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
            text: text.into(),
            url: None,
            icon_url: None,
            categories: Vec::new(),
        }
    }

    /// Attach the canonical URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
