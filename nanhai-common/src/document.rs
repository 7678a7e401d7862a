//! The game document: players plus the current fragment generation
//!
//! This is the single unit that is loaded, mutated and persisted by every
//! state-changing request, and the exact JSON shape served by `GET /data`.

use crate::catalog::ArtifactCatalog;
use crate::pool::FragmentPool;
use crate::registry::PlayerRegistry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDocument {
    #[serde(default)]
    pub players: PlayerRegistry,
    #[serde(default)]
    pub fragments: FragmentPool,
}

impl GameDocument {
    /// Empty player list and a freshly generated pool
    pub fn fresh(catalog: &ArtifactCatalog) -> Self {
        Self {
            players: PlayerRegistry::new(),
            fragments: FragmentPool::generate(catalog),
        }
    }

    /// True when a stored document has no pool yet and must be seeded
    pub fn needs_pool(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_document() {
        let doc = GameDocument::fresh(&ArtifactCatalog::default());
        assert!(doc.players.is_empty());
        assert_eq!(doc.fragments.len(), 40);
        assert!(!doc.needs_pool());
    }

    #[test]
    fn test_partial_document_deserializes() {
        let doc: GameDocument = serde_json::from_str(r#"{"players":[{"name":"a","score":4}]}"#).unwrap();
        assert_eq!(doc.players.get("a").unwrap().score, 4);
        assert!(doc.needs_pool());
    }

    #[test]
    fn test_wire_shape() {
        let mut doc = GameDocument::fresh(&ArtifactCatalog::default());
        doc.players.find_or_create("a");
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["players"].is_array());
        assert_eq!(json["players"][0]["name"], "a");
        assert_eq!(json["players"][0]["score"], 0);
        assert_eq!(json["fragments"].as_array().unwrap().len(), 40);
    }
}
