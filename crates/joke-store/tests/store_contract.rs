// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs)]

//! Behavior every backend must share, exercised through `dyn JokeStore`

use std::sync::Arc;

use joke_store::{
    InMemoryJokeStore, JokeStore, JokeUpdate, JsonFileJokeStore, NewJoke, StoreError,
    UNCATEGORIZED,
};

async fn backends() -> (Vec<Arc<dyn JokeStore>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let file_store = JsonFileJokeStore::open(dir.path().join("jokes.json"))
        .await
        .unwrap();
    let stores: Vec<Arc<dyn JokeStore>> =
        vec![Arc::new(InMemoryJokeStore::new()), Arc::new(file_store)];
    (stores, dir)
}

#[tokio::test]
async fn crud_lifecycle() {
    let (stores, _dir) = backends().await;
    for store in stores {
        let created = store
            .create(
                NewJoke::new("I told my wife she was drawing her eyebrows too high.")
                    .with_author("Pepe")
                    .with_rating(4.0)
                    .with_category("dad"),
            )
            .await
            .unwrap();

        let read = store.get(&created.id).await.unwrap();
        assert_eq!(read.text, created.text, "backend {}", store.backend());
        assert_eq!(read.author.as_deref(), Some("Pepe"));
        assert_eq!(read.rating, Some(4.0));
        assert_eq!(read.category.as_deref(), Some("dad"));

        let updated = store
            .update(
                &created.id,
                JokeUpdate {
                    author: Some("Pepa".to_string()),
                    ..JokeUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.author.as_deref(), Some("Pepa"));
        assert_eq!(updated.text, created.text);

        store.delete(&created.id).await.unwrap();
        assert!(matches!(
            store.get(&created.id).await,
            Err(StoreError::NotFound(id)) if id == created.id
        ));
        assert!(store.is_empty().await.unwrap());
    }
}

#[tokio::test]
async fn counting_and_filtering() {
    let (stores, _dir) = backends().await;
    for store in stores {
        store
            .create(NewJoke::new("one").with_category("puns").with_rating(2.0))
            .await
            .unwrap();
        store
            .create(NewJoke::new("two").with_category("puns").with_rating(5.0))
            .await
            .unwrap();
        store.create(NewJoke::new("three").with_rating(5.0)).await.unwrap();

        let counts = store.count_by_category().await.unwrap();
        assert_eq!(counts.get("puns"), Some(&2));
        assert_eq!(counts.get(UNCATEGORIZED), Some(&1));

        let fives = store.find_by_rating(5.0).await.unwrap();
        assert_eq!(fives.len(), 2);
        assert!(fives.iter().all(|joke| joke.rating == Some(5.0)));
        assert!(store.find_by_rating(7.0).await.unwrap().is_empty());

        let random = store.random().await.unwrap().unwrap();
        assert!(store.get(&random.id).await.is_ok());
        assert_eq!(store.list().await.unwrap().len(), 3);
    }
}
