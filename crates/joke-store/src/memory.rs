// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory joke store backed by `DashMap`

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use rand::seq::IteratorRandom;
use tracing::{debug, trace};

use crate::{
    Joke, JokeId, JokeStore, JokeUpdate, NewJoke, StoreError, StoreResult, count_categories,
    sort_jokes,
};

/// Process-local joke store; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryJokeStore {
    jokes: DashMap<JokeId, Joke>,
}

impl InMemoryJokeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `jokes`
    pub fn with_jokes(jokes: impl IntoIterator<Item = Joke>) -> Self {
        let store = Self::new();
        for joke in jokes {
            store.jokes.insert(joke.id, joke);
        }
        store
    }

    fn pick_random(&self) -> Option<Joke> {
        let mut rng = rand::thread_rng();
        self.jokes
            .iter()
            .choose(&mut rng)
            .map(|entry| entry.value().clone())
    }

    fn collect(&self, filter: impl Fn(&Joke) -> bool) -> Vec<Joke> {
        let mut jokes: Vec<Joke> = self
            .jokes
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_jokes(&mut jokes);
        jokes
    }
}

#[async_trait]
impl JokeStore for InMemoryJokeStore {
    async fn create(&self, new: NewJoke) -> StoreResult<Joke> {
        let joke = Joke::from_new(JokeId::new_v4(), new)?;
        self.jokes.insert(joke.id, joke.clone());
        debug!(joke_id = %joke.id, "stored joke in memory");
        Ok(joke)
    }

    async fn get(&self, id: &JokeId) -> StoreResult<Joke> {
        self.jokes
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound(*id))
    }

    async fn update(&self, id: &JokeId, update: JokeUpdate) -> StoreResult<Joke> {
        let mut entry = self.jokes.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        entry.apply(update)?;
        trace!(joke_id = %id, "updated joke in memory");
        Ok(entry.clone())
    }

    async fn delete(&self, id: &JokeId) -> StoreResult<Joke> {
        self.jokes
            .remove(id)
            .map(|(_, joke)| joke)
            .ok_or(StoreError::NotFound(*id))
    }

    async fn list(&self) -> StoreResult<Vec<Joke>> {
        Ok(self.collect(|_| true))
    }

    async fn count_by_category(&self) -> StoreResult<BTreeMap<String, usize>> {
        Ok(count_categories(self.jokes.iter()))
    }

    async fn find_by_rating(&self, rating: f64) -> StoreResult<Vec<Joke>> {
        Ok(self.collect(|joke| joke.has_rating(rating)))
    }

    async fn random(&self) -> StoreResult<Option<Joke>> {
        Ok(self.pick_random())
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.jokes.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
