//! Bracket persistence boundary.
//!
//! Brackets are loaded and saved whole, guarded by optimistic version
//! checks. [`InMemoryBracketRepository`] keeps bincode snapshots in process.

pub mod errors;
pub mod repository;

pub use errors::{StoreError, StoreResult};
pub use repository::{
    BracketRepository, InMemoryBracketRepository, UNSAVED_VERSION, Version, VersionedBracket,
};
