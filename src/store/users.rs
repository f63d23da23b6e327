//! User accounts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, VaultError};

/// A registered account. The password hash is opaque to this store —
/// hashing and verification live in the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted store shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserData {
    next_id: u64,
    users: HashMap<u64, User>,
}

/// Async user store backed by an in-memory map and optional JSON file.
///
/// Clone is cheap — all clones share the same `Arc<RwLock<_>>`.
#[derive(Clone)]
pub struct UserStore {
    data: Arc<RwLock<UserData>>,
    path: Option<PathBuf>,
}

impl UserStore {
    /// Create a store backed by a JSON file at `path`. Call
    /// [`load`](Self::load) after construction to restore persisted users.
    pub fn new(path: PathBuf) -> Self {
        Self {
            data: Arc::new(RwLock::new(UserData::default())),
            path: Some(path),
        }
    }

    /// Create an in-memory-only store (useful for tests).
    pub fn new_in_memory() -> Self {
        Self {
            data: Arc::new(RwLock::new(UserData::default())),
            path: None,
        }
    }

    /// Load users from the backing JSON file. No-op if the file does not
    /// exist or this is an in-memory store.
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

    /// Persist the current state to disk. No-op for in-memory stores.
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

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// [`VaultError::Conflict`] when the email is already registered.
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<User> {
        let user = {
            let mut data = self.data.write().await;
            if data.users.values().any(|u| u.email == email) {
                return Err(VaultError::Conflict("email already registered".into()));
            }
            data.next_id += 1;
            let user = User {
                id: data.next_id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            };
            data.users.insert(user.id, user.clone());
            user
        };
        self.save().await?;
        Ok(user)
    }

    /// Look up an account by email.
    pub async fn get_by_email(&self, email: &str) -> Option<User> {
        self.data
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Look up an account by ID.
    pub async fn get(&self, id: u64) -> Option<User> {
        self.data.read().await.users.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let store = UserStore::new_in_memory();
        let user = store.create("ash@example.com", "hash").await.unwrap();
        assert_eq!(user.id, 1);

        let by_email = store.get_by_email("ash@example.com").await.unwrap();
        assert_eq!(by_email, user);
        assert_eq!(store.get(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = UserStore::new_in_memory();
        store.create("ash@example.com", "hash").await.unwrap();
        let err = store.create("ash@example.com", "hash2").await.unwrap_err();
        assert!(matches!(err, VaultError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let store = UserStore::new_in_memory();
        let a = store.create("a@example.com", "h").await.unwrap();
        let b = store.create("b@example.com", "h").await.unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[tokio::test]
    async fn test_unknown_lookups_return_none() {
        let store = UserStore::new_in_memory();
        assert!(store.get_by_email("ghost@example.com").await.is_none());
        assert!(store.get(42).await.is_none());
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let store = UserStore::new(path.clone());
        let user = store.create("misty@example.com", "hash").await.unwrap();

        let store2 = UserStore::new(path);
        store2.load().await.unwrap();
        assert_eq!(store2.get(user.id).await.unwrap().email, "misty@example.com");

        // The ID counter survives the reload.
        let next = store2.create("brock@example.com", "hash").await.unwrap();
        assert_eq!(next.id, user.id + 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = UserStore::new(dir.path().join("missing.json"));
        store.load().await.unwrap();
        assert!(store.get(1).await.is_none());
    }
}
