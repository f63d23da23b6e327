//! Error types for PokeVault.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VaultError>;

/// All error kinds surfaced by PokeVault components.
///
/// The Pokédex layer distinguishes [`VaultError::NotFound`] (the identifier
/// does not exist upstream — terminal, not retried further) from
/// [`VaultError::Upstream`] (network/timeout/non-2xx after exhausted
/// retries). Neither is ever cached. A cache miss is not an error.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The requested entity does not exist (upstream 404, unknown team, ...).
    #[error("not found: {0}")]
    NotFound(String),

    /// The upstream Pokémon API could not be reached or kept failing.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Missing/invalid credentials or token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The entity already exists (duplicate collection entry, team member, email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request was well-formed but semantically invalid (blank team name,
    /// empty collection where one is required, full team).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration problem (missing API key, bad secret, bcrypt failure).
    #[error("config error: {0}")]
    Config(String),

    /// Chat-model provider failure (request error, unparseable response).
    #[error("provider error: {0}")]
    Provider(String),

    /// Filesystem error from the JSON-backed stores.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
