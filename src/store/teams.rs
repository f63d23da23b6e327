//! Per-user teams of up to six distinct Pokémon.
//!
//! The store enforces the structural rules (size cap, distinct members,
//! non-blank names, ownership on every access). Whether a member belongs to
//! the caller's collection is checked at the API layer, which owns the
//! collection store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, VaultError};

/// Maximum members per team.
pub const MAX_TEAM_SIZE: usize = 6;

/// One slot in a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamMember {
    pub pokemon_id: u32,
    pub added_at: DateTime<Utc>,
}

/// A named team owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub members: Vec<TeamMember>,
}

/// Persisted store shape.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TeamData {
    next_id: u64,
    teams: HashMap<u64, Team>,
}

/// Async team store backed by an in-memory map and optional JSON file.
#[derive(Clone)]
pub struct TeamStore {
    data: Arc<RwLock<TeamData>>,
    path: Option<PathBuf>,
}

impl TeamStore {
    /// Create a store backed by a JSON file at `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            data: Arc::new(RwLock::new(TeamData::default())),
            path: Some(path),
        }
    }

    /// Create an in-memory-only store (useful for tests).
    pub fn new_in_memory() -> Self {
        Self {
            data: Arc::new(RwLock::new(TeamData::default())),
            path: None,
        }
    }

    /// Load teams from the backing JSON file. No-op if the file does not
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

    /// Create an empty team. The name is trimmed and must be non-blank.
    pub async fn create(&self, user_id: u64, name: &str) -> Result<Team> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::InvalidInput("name required".into()));
        }
        let team = {
            let mut data = self.data.write().await;
            data.next_id += 1;
            let team = Team {
                id: data.next_id,
                user_id,
                name: name.to_string(),
                created_at: Utc::now(),
                members: Vec::new(),
            };
            data.teams.insert(team.id, team.clone());
            team
        };
        self.save().await?;
        Ok(team)
    }

    /// All teams owned by `user_id`, newest first.
    pub async fn list_by_user(&self, user_id: u64) -> Vec<Team> {
        let data = self.data.read().await;
        let mut teams: Vec<Team> = data
            .teams
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        teams
    }

    /// Fetch a team owned by `user_id`.
    ///
    /// A team that exists but belongs to someone else is reported as
    /// [`VaultError::NotFound`] — ownership is never leaked.
    pub async fn get_owned(&self, team_id: u64, user_id: u64) -> Result<Team> {
        self.data
            .read()
            .await
            .teams
            .get(&team_id)
            .filter(|t| t.user_id == user_id)
            .cloned()
            .ok_or_else(|| VaultError::NotFound("team not found".into()))
    }

    /// Rename an owned team. The new name is trimmed and must be non-blank.
    pub async fn rename(&self, team_id: u64, user_id: u64, new_name: &str) -> Result<Team> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(VaultError::InvalidInput("name required".into()));
        }
        let team = {
            let mut data = self.data.write().await;
            let team = data
                .teams
                .get_mut(&team_id)
                .filter(|t| t.user_id == user_id)
                .ok_or_else(|| VaultError::NotFound("team not found".into()))?;
            team.name = new_name.to_string();
            team.clone()
        };
        self.save().await?;
        Ok(team)
    }

    /// Add a member to an owned team.
    ///
    /// # Errors
    ///
    /// - [`VaultError::NotFound`] — team missing or not owned.
    /// - [`VaultError::InvalidInput`] — team already has [`MAX_TEAM_SIZE`] members.
    /// - [`VaultError::Conflict`] — the Pokémon is already on the team.
    pub async fn add_member(&self, team_id: u64, user_id: u64, pokemon_id: u32) -> Result<Team> {
        let team = {
            let mut data = self.data.write().await;
            let team = data
                .teams
                .get_mut(&team_id)
                .filter(|t| t.user_id == user_id)
                .ok_or_else(|| VaultError::NotFound("team not found".into()))?;
            if team.members.len() >= MAX_TEAM_SIZE {
                return Err(VaultError::InvalidInput(format!(
                    "team full (max {MAX_TEAM_SIZE} pokemon)"
                )));
            }
            if team.members.iter().any(|m| m.pokemon_id == pokemon_id) {
                return Err(VaultError::Conflict("pokemon already in this team".into()));
            }
            team.members.push(TeamMember {
                pokemon_id,
                added_at: Utc::now(),
            });
            team.clone()
        };
        self.save().await?;
        Ok(team)
    }

    /// Remove a member from an owned team.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] — team missing/not owned, or the Pokémon is
    /// not a member.
    pub async fn remove_member(&self, team_id: u64, user_id: u64, pokemon_id: u32) -> Result<Team> {
        let team = {
            let mut data = self.data.write().await;
            let team = data
                .teams
                .get_mut(&team_id)
                .filter(|t| t.user_id == user_id)
                .ok_or_else(|| VaultError::NotFound("team not found".into()))?;
            let before = team.members.len();
            team.members.retain(|m| m.pokemon_id != pokemon_id);
            if team.members.len() == before {
                return Err(VaultError::NotFound("pokemon not in this team".into()));
            }
            team.clone()
        };
        self.save().await?;
        Ok(team)
    }

    /// Delete an owned team.
    pub async fn delete(&self, team_id: u64, user_id: u64) -> Result<()> {
        {
            let mut data = self.data.write().await;
            let owned = data
                .teams
                .get(&team_id)
                .is_some_and(|t| t.user_id == user_id);
            if !owned {
                return Err(VaultError::NotFound("team not found".into()));
            }
            data.teams.remove(&team_id);
        }
        self.save().await
    }
}
