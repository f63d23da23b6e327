//! JSON-file-backed stores for users, collections, and teams.
//!
//! Each store is an `Arc<RwLock<_>>`-shared map persisted as a whole file
//! after every mutation, with an in-memory variant for tests. State is
//! loaded once at startup; there are no migrations and no external
//! database.

pub mod collection;
pub mod teams;
pub mod users;

pub use collection::CollectionStore;
pub use teams::{Team, TeamMember, TeamStore, MAX_TEAM_SIZE};
pub use users::{User, UserStore};
