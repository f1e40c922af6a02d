// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! JSON file backed joke store
//!
//! The whole collection lives in memory behind a `tokio::sync::Mutex`. Every
//! mutation rewrites the file by writing a sibling temp file and renaming it over
//! the original, so a crash never leaves a half-written file behind. A mutation
//! whose write fails is rolled back in memory.

use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use rand::seq::IteratorRandom;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use crate::{
    Joke, JokeId, JokeStore, JokeUpdate, NewJoke, StoreError, StoreResult, count_categories,
    sort_jokes,
};

/// Joke store persisted to a single JSON file
#[derive(Debug)]
pub struct JsonFileJokeStore {
    path: PathBuf,
    jokes: Mutex<HashMap<JokeId, Joke>>,
}

impl JsonFileJokeStore {
    /// Open the store at `path`, loading existing jokes
    ///
    /// A missing file is treated as an empty store; it is created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let jokes = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => HashMap::new(),
            Ok(bytes) => {
                let jokes: Vec<Joke> = serde_json::from_slice(&bytes)?;
                jokes.into_iter().map(|joke| (joke.id, joke)).collect()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "joke file not found, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), count = jokes.len(), "loaded joke file");
        Ok(Self {
            path,
            jokes: Mutex::new(jokes),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, jokes: &HashMap<JokeId, Joke>) -> StoreResult<()> {
        let mut snapshot: Vec<Joke> = jokes.values().cloned().collect();
        sort_jokes(&mut snapshot);
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), count = snapshot.len(), "persisted joke file");
        Ok(())
    }
}

#[async_trait]
impl JokeStore for JsonFileJokeStore {
    async fn create(&self, new: NewJoke) -> StoreResult<Joke> {
        let joke = Joke::from_new(JokeId::new_v4(), new)?;
        let mut jokes = self.jokes.lock().await;
        jokes.insert(joke.id, joke.clone());

        if let Err(e) = self.persist(&jokes).await {
            warn!(joke_id = %joke.id, error = %e, "failed to persist new joke");
            jokes.remove(&joke.id);
            return Err(e);
        }
        Ok(joke)
    }

    async fn get(&self, id: &JokeId) -> StoreResult<Joke> {
        self.jokes
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn update(&self, id: &JokeId, update: JokeUpdate) -> StoreResult<Joke> {
        let mut jokes = self.jokes.lock().await;
        let joke = jokes.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        let previous = joke.clone();
        joke.apply(update)?;
        let updated = joke.clone();

        if let Err(e) = self.persist(&jokes).await {
            warn!(joke_id = %id, error = %e, "failed to persist joke update");
            jokes.insert(*id, previous);
            return Err(e);
        }
        Ok(updated)
    }

    async fn delete(&self, id: &JokeId) -> StoreResult<Joke> {
        let mut jokes = self.jokes.lock().await;
        let removed = jokes.remove(id).ok_or(StoreError::NotFound(*id))?;

        if let Err(e) = self.persist(&jokes).await {
            warn!(joke_id = %id, error = %e, "failed to persist joke deletion");
            jokes.insert(*id, removed);
            return Err(e);
        }
        Ok(removed)
    }

    async fn list(&self) -> StoreResult<Vec<Joke>> {
        let mut jokes: Vec<Joke> = self.jokes.lock().await.values().cloned().collect();
        sort_jokes(&mut jokes);
        Ok(jokes)
    }

    async fn count_by_category(&self) -> StoreResult<BTreeMap<String, usize>> {
        Ok(count_categories(self.jokes.lock().await.values()))
    }

    async fn find_by_rating(&self, rating: f64) -> StoreResult<Vec<Joke>> {
        let mut jokes: Vec<Joke> = self
            .jokes
            .lock()
            .await
            .values()
            .filter(|joke| joke.has_rating(rating))
            .cloned()
            .collect();
        sort_jokes(&mut jokes);
        Ok(jokes)
    }

    async fn random(&self) -> StoreResult<Option<Joke>> {
        let jokes = self.jokes.lock().await;
        Ok(choose_random(&jokes))
    }

    async fn len(&self) -> StoreResult<usize> {
        Ok(self.jokes.lock().await.len())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}

fn choose_random(jokes: &HashMap<JokeId, Joke>) -> Option<Joke> {
    jokes.values().choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileJokeStore::open(dir.path().join("jokes.json"))
            .await
            .unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn jokes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jokes.json");

        let store = JsonFileJokeStore::open(&path).await.unwrap();
        let kept = store
            .create(NewJoke::new("persisted").with_rating(4.5).with_category("file"))
            .await
            .unwrap();
        let dropped = store.create(NewJoke::new("deleted")).await.unwrap();
        store.delete(&dropped.id).await.unwrap();
        drop(store);

        let reopened = JsonFileJokeStore::open(&path).await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 1);
        assert_eq!(reopened.get(&kept.id).await.unwrap(), kept);
        assert!(matches!(
            reopened.get(&dropped.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.json");

        let store = JsonFileJokeStore::open(&path).await.unwrap();
        let joke = store.create(NewJoke::new("before")).await.unwrap();
        store
            .update(
                &joke.id,
                JokeUpdate {
                    text: Some("after".to_string()),
                    ..JokeUpdate::default()
                },
            )
            .await
            .unwrap();

        let reopened = JsonFileJokeStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(&joke.id).await.unwrap().text, "after");
    }

    #[tokio::test]
    async fn corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jokes.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileJokeStore::open(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the target path makes the rename fail
        let path = dir.path().join("jokes.json");
        std::fs::create_dir(&path).unwrap();

        let store = JsonFileJokeStore {
            path,
            jokes: Mutex::new(HashMap::new()),
        };
        let err = store.create(NewJoke::new("lost")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
