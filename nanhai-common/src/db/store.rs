//! Document store: load and versioned save of the game document
//!
//! Every mutating request reads the document with its version and writes it
//! back conditioned on that version. A write that matches no row means some
//! other writer got there first and yields [`Error::Conflict`]; the caller
//! reloads and retries.

use crate::catalog::ArtifactCatalog;
use crate::document::GameDocument;
use crate::pool::FragmentPool;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

const DEFAULT_DOCUMENT_KEY: &str = "game";

/// A document together with the version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    pub version: i64,
    pub document: GameDocument,
}

/// Persistence gateway over the `game_documents` table
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
    key: String,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_key(pool, DEFAULT_DOCUMENT_KEY)
    }

    /// Store addressing a specific document key
    pub fn with_key(pool: SqlitePool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the current document, or `None` if it was never written
    pub async fn load(&self) -> Result<Option<VersionedDocument>> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT version, body FROM game_documents WHERE key = ?")
                .bind(&self.key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((version, body)) => {
                let document = serde_json::from_str(&body)?;
                Ok(Some(VersionedDocument { version, document }))
            }
            None => Ok(None),
        }
    }

    /// Write the first version of the document
    ///
    /// Fails with [`Error::Conflict`] if a document already exists under the key.
    pub async fn insert_initial(&self, document: &GameDocument) -> Result<i64> {
        let body = serde_json::to_string(document)?;
        let result = sqlx::query(
            r#"
            INSERT INTO game_documents (key, version, body, updated_at)
            VALUES (?, 1, ?, ?)
            ON CONFLICT(key) DO NOTHING
            "#,
        )
        .bind(&self.key)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Conflict { expected: 0 });
        }
        Ok(1)
    }

    /// Replace the document if it is still at `expected_version`
    ///
    /// Returns the new version.
    pub async fn save(&self, document: &GameDocument, expected_version: i64) -> Result<i64> {
        let body = serde_json::to_string(document)?;
        let result = sqlx::query(
            r#"
            UPDATE game_documents
            SET version = version + 1, body = ?, updated_at = ?
            WHERE key = ? AND version = ?
            "#,
        )
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .bind(&self.key)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(
                "Document '{}' moved past version {}",
                self.key, expected_version
            );
            return Err(Error::Conflict {
                expected: expected_version,
            });
        }
        Ok(expected_version + 1)
    }

    /// Load the document, creating or repairing it at startup
    ///
    /// A missing document is created with no players and a fresh pool; a
    /// stored document without fragments gets a fresh pool and keeps its players.
    pub async fn load_or_init(&self, catalog: &ArtifactCatalog) -> Result<VersionedDocument> {
        match self.load().await? {
            Some(mut current) if current.document.needs_pool() => {
                info!("Stored document has no fragment pool, generating one");
                current.document.fragments = FragmentPool::generate(catalog);
                current.version = self.save(&current.document, current.version).await?;
                Ok(current)
            }
            Some(current) => {
                info!(
                    "Loaded game document v{} ({} players, {} unclaimed fragments)",
                    current.version,
                    current.document.players.len(),
                    current.document.fragments.unclaimed_count()
                );
                Ok(current)
            }
            None => {
                let document = GameDocument::fresh(catalog);
                let version = self.insert_initial(&document).await?;
                info!(
                    "Created new game document with {} fragments",
                    document.fragments.len()
                );
                Ok(VersionedDocument { version, document })
            }
        }
    }
}
