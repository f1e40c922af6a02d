// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Joke records and the payloads used to create and update them

use core::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{StoreError, StoreResult};

/// Category reported for jokes stored without one
pub const UNCATEGORIZED: &str = "uncategorized";

/// Store-assigned identifier of a joke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "0b5b6a4e-2f7c-4a0e-9a57-4c0d3f5e7a11")]
pub struct JokeId(Uuid);

impl JokeId {
    /// Generate a fresh random id
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for JokeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for JokeId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A locally authored joke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Joke {
    /// Unique id, assigned at creation
    pub id: JokeId,
    /// Joke content
    #[schema(example = "¿Qué le dice un techo a otro? Techo de menos.")]
    pub text: String,
    /// Who wrote the joke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Numeric score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Grouping label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// When the joke was created
    pub created_at: DateTime<Utc>,
    /// When the joke was last modified
    pub updated_at: DateTime<Utc>,
}

impl Joke {
    /// Build a stored joke from a validated payload
    pub fn from_new(id: JokeId, new: NewJoke) -> StoreResult<Self> {
        new.validate()?;
        let now = Utc::now();
        Ok(Self {
            id,
            text: new.text,
            author: new.author,
            rating: new.rating,
            category: new.category,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, leaving absent fields unchanged
    pub fn apply(&mut self, update: JokeUpdate) -> StoreResult<()> {
        update.validate()?;
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(author) = update.author {
            self.author = Some(author);
        }
        if let Some(rating) = update.rating {
            self.rating = Some(rating);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Category used for grouping, falling back to [`UNCATEGORIZED`]
    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(UNCATEGORIZED)
    }

    /// Whether the joke carries exactly this rating
    pub fn has_rating(&self, rating: f64) -> bool {
        self.rating.is_some_and(|r| (r - rating).abs() < f64::EPSILON)
    }
}

/// Payload for creating a joke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewJoke {
    /// Joke content, must not be blank
    pub text: String,
    /// Who wrote the joke
    #[serde(default)]
    pub author: Option<String>,
    /// Numeric score
    #[serde(default)]
    pub rating: Option<f64>,
    /// Grouping label
    #[serde(default)]
    pub category: Option<String>,
}

impl NewJoke {
    /// Create a payload with only the text set
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
            rating: None,
            category: None,
        }
    }

    /// Set the author
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the rating
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Set the category
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Check the payload can be stored
    pub fn validate(&self) -> StoreResult<()> {
        validate_text(&self.text)?;
        validate_rating(self.rating)
    }
}

/// Payload for updating a joke; only provided fields are replaced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JokeUpdate {
    /// New content, must not be blank when provided
    #[serde(default)]
    pub text: Option<String>,
    /// New author
    #[serde(default)]
    pub author: Option<String>,
    /// New rating
    #[serde(default)]
    pub rating: Option<f64>,
    /// New category
    #[serde(default)]
    pub category: Option<String>,
}

impl JokeUpdate {
    /// Check the update can be applied
    pub fn validate(&self) -> StoreResult<()> {
        if let Some(text) = &self.text {
            validate_text(text)?;
        }
        validate_rating(self.rating)
    }
}

fn validate_text(text: &str) -> StoreResult<()> {
    if text.trim().is_empty() {
        return Err(StoreError::Validation("text must not be empty".to_string()));
    }
    Ok(())
}

fn validate_rating(rating: Option<f64>) -> StoreResult<()> {
    match rating {
        Some(r) if !r.is_finite() => Err(StoreError::Validation(
            "rating must be a finite number".to_string(),
        )),
        _ => Ok(()),
    }
}
