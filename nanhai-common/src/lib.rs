//! # Nanhai Common Library
//!
//! Shared code for the Nanhai dive game including:
//! - Artifact catalog (static configuration data)
//! - Fragment pool and player registry
//! - The game document and its SQLite-backed store
//! - Event types broadcast to connected clients
//! - Configuration loading

pub mod catalog;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod events;
pub mod pool;
pub mod registry;

pub use catalog::{Artifact, ArtifactCatalog};
pub use document::GameDocument;
pub use error::{Error, Result};
pub use pool::{Fragment, FragmentPool};
pub use registry::{Player, PlayerRegistry};
