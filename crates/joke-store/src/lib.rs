// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Storage for locally authored ("Propio") jokes
//!
//! The server only talks to the [`JokeStore`] trait, so the backend is chosen at
//! startup and injected as an `Arc<dyn JokeStore>`.
//!
//! # Backends
//!
//! - [`InMemoryJokeStore`]: `DashMap` backed, lost on restart
//! - [`JsonFileJokeStore`]: keeps every joke in a JSON file, rewritten atomically on each mutation
//!
//! With the `mock` feature enabled, `MockJokeStore` is generated for tests that
//! need to simulate backend failures.
//!
//! # Examples
//!
//! ```rust
//! use joke_store::{InMemoryJokeStore, JokeStore, NewJoke};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), joke_store::StoreError> {
//! let store = InMemoryJokeStore::new();
//! let joke = store.create(NewJoke::new("Knock knock").with_category("puns")).await?;
//!
//! assert_eq!(store.get(&joke.id).await?.text, "Knock knock");
//! assert_eq!(store.count_by_category().await?["puns"], 1);
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, ops::Deref};

use async_trait::async_trait;

pub mod error;
pub mod file;
pub mod memory;
pub mod model;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileJokeStore;
pub use memory::InMemoryJokeStore;
pub use model::{Joke, JokeId, JokeUpdate, NewJoke, UNCATEGORIZED};

/// Persistence abstraction for locally authored jokes
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait JokeStore: Send + Sync {
    /// Validate and store a new joke, assigning it a fresh id
    async fn create(&self, new: NewJoke) -> StoreResult<Joke>;

    /// Fetch a joke by id
    async fn get(&self, id: &JokeId) -> StoreResult<Joke>;

    /// Replace the provided fields of an existing joke
    async fn update(&self, id: &JokeId, update: JokeUpdate) -> StoreResult<Joke>;

    /// Remove a joke, returning what was stored
    async fn delete(&self, id: &JokeId) -> StoreResult<Joke>;

    /// Every stored joke, oldest first
    async fn list(&self) -> StoreResult<Vec<Joke>>;

    /// Number of jokes per category; jokes without one count as [`UNCATEGORIZED`]
    async fn count_by_category(&self) -> StoreResult<BTreeMap<String, usize>>;

    /// All and only the jokes whose rating equals `rating`
    async fn find_by_rating(&self, rating: f64) -> StoreResult<Vec<Joke>>;

    /// A uniformly random joke, or `None` when the store is empty
    async fn random(&self) -> StoreResult<Option<Joke>>;

    /// Number of stored jokes
    async fn len(&self) -> StoreResult<usize>;

    /// Whether the store holds no jokes
    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Short backend name used in logs and health output
    fn backend(&self) -> &'static str;
}

/// Group jokes by category the way every backend reports counts
pub(crate) fn count_categories<J>(jokes: impl IntoIterator<Item = J>) -> BTreeMap<String, usize>
where
    J: Deref<Target = Joke>,
{
    let mut counts = BTreeMap::new();
    for joke in jokes {
        *counts.entry(joke.category_or_default().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Sort jokes oldest first, breaking ties by id
pub(crate) fn sort_jokes(jokes: &mut [Joke]) {
    jokes.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
