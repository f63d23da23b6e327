//! MCP stdio tool-server.
//!
//! A thin client over the PokeVault HTTP API: every MCP tool call becomes
//! one authenticated backend request. Speaks newline-delimited JSON-RPC 2.0
//! on stdin/stdout.

pub mod protocol;
pub mod server;

pub use server::{BackendClient, McpServer};
