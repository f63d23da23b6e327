//! Per-user Pokémon collections.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, VaultError};

/// One collected Pokémon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct CollectionEntry {
    pokemon_id: u32,
    added_at: DateTime<Utc>,
}

/// Async collection store backed by an in-memory map and optional JSON file.
///
/// Keyed by user ID; each user holds an ordered list of distinct Pokémon
/// IDs (insertion order, listed newest first).
///
/// # Example
///
/// ```rust
/// # tokio_test::block_on(async {
/// use pokevault::store::CollectionStore;
///
/// let store = CollectionStore::new_in_memory();
/// store.add(1, 25).await.unwrap();
/// assert_eq!(store.list_ids(1).await, vec![25]);
/// # });
/// ```
#[derive(Clone)]
pub struct CollectionStore {
    data: Arc<RwLock<HashMap<u64, Vec<CollectionEntry>>>>,
    path: Option<PathBuf>,
}

impl CollectionStore {
    /// Create a store backed by a JSON file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            path: Some(path),
        }
    }

    /// Create an in-memory-only store (useful for tests).
    pub fn new_in_memory() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            path: None,
        }
    }

    /// Load collections from the backing JSON file. No-op if the file does
    /// not exist or this is an in-memory store.
    pub async fn load(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(());
        }
        let raw = tokio::fs::read_to_string(path).await?;
        *self.data.write().await = serde_json::from_str(&raw)?;
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let raw = {
            let data = self.data.read().await;
            serde_json::to_string_pretty(&*data)?
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, raw).await?;
        Ok(())
    }

    /// Add `pokemon_id` to the user's collection.
    ///
    /// # Errors
    ///
    /// [`VaultError::Conflict`] when the Pokémon is already collected.
    pub async fn add(&self, user_id: u64, pokemon_id: u32) -> Result<()> {
        {
            let mut data = self.data.write().await;
            let entries = data.entry(user_id).or_default();
            if entries.iter().any(|e| e.pokemon_id == pokemon_id) {
                return Err(VaultError::Conflict("already in collection".into()));
            }
            entries.push(CollectionEntry {
                pokemon_id,
                added_at: Utc::now(),
            });
        }
        self.save().await
    }

    /// Remove `pokemon_id` from the user's collection.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] when the Pokémon is not in the collection.
    pub async fn remove(&self, user_id: u64, pokemon_id: u32) -> Result<()> {
        {
            let mut data = self.data.write().await;
            let entries = data.entry(user_id).or_default();
            let before = entries.len();
            entries.retain(|e| e.pokemon_id != pokemon_id);
            if entries.len() == before {
                return Err(VaultError::NotFound("not in collection".into()));
            }
        }
        self.save().await
    }

    /// True when the user has collected `pokemon_id`.
    pub async fn contains(&self, user_id: u64, pokemon_id: u32) -> bool {
        self.data
            .read()
            .await
            .get(&user_id)
            .map(|entries| entries.iter().any(|e| e.pokemon_id == pokemon_id))
            .unwrap_or(false)
    }

    /// The user's Pokémon IDs, most recently added first.
    pub async fn list_ids(&self, user_id: u64) -> Vec<u32> {
        self.data
            .read()
            .await
            .get(&user_id)
            .map(|entries| entries.iter().rev().map(|e| e.pokemon_id).collect())
            .unwrap_or_default()
    }
}
