//! Durable storage for the game document
//!
//! SQLite (via sqlx) used as a key-value document store: one row per document,
//! holding the JSON body and a version counter for optimistic writes.

pub mod init;
pub mod store;

pub use init::{init_database, init_memory_database};
pub use store::{DocumentStore, VersionedDocument};
