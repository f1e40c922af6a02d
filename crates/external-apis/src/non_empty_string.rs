// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation utilities
//!
//! This module provides [`NonEmptyString`], a wrapper type whose constructor rejects
//! empty and whitespace-only input. Provider configurations use it so a blank base
//! URL is refused when the configuration is built instead of when the first
//! request goes out.
//!
//! # Examples
//!
//! ```rust
//! use external_apis::NonEmptyString;
//!
//! let base_url = NonEmptyString::new("https://api.chucknorris.io").expect("valid URL");
//! assert_eq!(base_url.as_str(), "https://api.chucknorris.io");
//!
//! assert!(NonEmptyString::new("").is_err());
//! assert!(NonEmptyString::new("   \t\n  ").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

/// A non-empty string wrapper that ensures validity at construction
///
/// The contained string has at least one non-whitespace character and is
/// immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Create a new `NonEmptyString` from any string-like input
    ///
    /// Leading and trailing whitespace is preserved; only blank input is rejected.
    ///
    /// ```rust
    /// use external_apis::NonEmptyString;
    ///
    /// assert!(NonEmptyString::new(" dad jokes ").is_ok());
    /// assert!(NonEmptyString::new("\t\n").is_err());
    /// ```
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Get a string slice of the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
