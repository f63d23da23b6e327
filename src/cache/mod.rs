//! Process-wide TTL caching.

pub mod ttl;

pub use ttl::TtlCache;
