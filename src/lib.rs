//! PokeVault — Pokémon collection backend.
//!
//! A single binary exposing:
//! - an axum HTTP API (`pokevault serve`): JWT auth, per-user collection and
//!   team CRUD, a cached Pokédex over the upstream PokeAPI, and AI helpers
//!   backed by an opaque chat-model provider;
//! - an MCP stdio tool-server (`pokevault mcp`) that is a thin client of the
//!   same HTTP endpoints.

pub mod ai;
pub mod api;
pub mod cache;
pub mod config;
pub mod dex;
pub mod error;
pub mod mcp;
pub mod store;
