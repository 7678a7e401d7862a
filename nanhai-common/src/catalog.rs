//! Artifact catalog
//!
//! The catalog is static configuration data: the list of collectible artifacts,
//! each split into four quadrant fragments. The built-in catalog describes the
//! cargo of the Nanhai No.1 shipwreck; operators may replace it with a TOML file.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Number of fragments (quadrants) each artifact is split into
pub const QUADRANTS: u8 = 4;

/// A collectible item made of four quadrant fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique slug, e.g. `silver_ingot`
    pub key: String,
    /// Display name
    pub name: String,
    /// Points awarded per fragment found
    pub points: u32,
    /// Image reference served by the static asset layer
    pub image: String,
    /// Flavor text, one entry per quadrant (index 0 is quadrant 1)
    pub blurbs: [String; 4],
}

impl Artifact {
    /// Flavor text for a quadrant in `1..=4`
    pub fn blurb(&self, quadrant: u8) -> Option<&str> {
        if quadrant == 0 || quadrant > QUADRANTS {
            return None;
        }
        self.blurbs.get(usize::from(quadrant - 1)).map(String::as_str)
    }
}

/// Ordered, immutable list of artifacts
///
/// Order matters: fragment ids are assigned by walking the catalog in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCatalog {
    artifacts: Vec<Artifact>,
}

impl ArtifactCatalog {
    /// Build a catalog, rejecting empty lists, blank fields and duplicate keys
    pub fn new(artifacts: Vec<Artifact>) -> Result<Self> {
        if artifacts.is_empty() {
            return Err(Error::Config("artifact catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for artifact in &artifacts {
            if artifact.key.trim().is_empty() {
                return Err(Error::Config("artifact with empty key".to_string()));
            }
            if artifact.name.trim().is_empty() {
                return Err(Error::Config(format!(
                    "artifact '{}' has an empty name",
                    artifact.key
                )));
            }
            if !seen.insert(artifact.key.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate artifact key '{}'",
                    artifact.key
                )));
            }
        }

        Ok(Self { artifacts })
    }

    /// Parse a catalog from TOML (`[[artifacts]]` tables)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct CatalogFile {
            artifacts: Vec<Artifact>,
        }

        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid catalog file: {}", e)))?;
        Self::new(file.artifacts)
    }

    /// Load a catalog file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read catalog {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn get(&self, key: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.key == key)
    }

    /// Flavor text for one fragment of an artifact
    pub fn blurb(&self, key: &str, quadrant: u8) -> Option<&str> {
        self.get(key)?.blurb(quadrant)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total fragments in one pool generation
    pub fn fragment_count(&self) -> usize {
        self.artifacts.len() * usize::from(QUADRANTS)
    }
}

impl Default for ArtifactCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

fn artifact(key: &str, name: &str, points: u32, image: &str, blurbs: [&str; 4]) -> Artifact {
    Artifact {
        key: key.to_string(),
        name: name.to_string(),
        points,
        image: image.to_string(),
        blurbs: blurbs.map(str::to_string),
    }
}

static DEFAULT_CATALOG: Lazy<ArtifactCatalog> = Lazy::new(|| ArtifactCatalog {
    artifacts: vec![
        artifact(
            "empty_box",
            "Empty Box",
            0,
            "images/artifacts/Box.png",
            ["Sorry, someone got here before you did!"; 4],
        ),
        artifact(
            "coins",
            "Copper Coins",
            1,
            "images/artifacts/Coin.png",
            [
                "Mixed cash coins from Han to Southern Song periods reveal centuries of circulation along the Maritime Silk Road.",
                "Mint marks trace Fujian and Guangdong workshops, maritime provinces key to Song-era trade.",
                "Corrosion and sand infill suggest long submersion and shifting currents across the seabed.",
                "Identical coins appear in Indonesia and the Philippines, evidence of a shared trade zone.",
            ],
        ),
        artifact(
            "silver_ingot",
            "Stamped Silver Ingot",
            2,
            "images/artifacts/SilverIngot.png",
            [
                "Stamped with shop names and weights, these ingots acted like signed contracts in metal.",
                "Marks such as 京销 linked the silver to Hangzhou's commercial guilds.",
                "They reveal Song-era trust networks spanning China's port cities.",
                "Similar ingots have been found in Quanzhou and Guangzhou, mapping sea-based finance.",
            ],
        ),
        artifact(
            "longquan",
            "Longquan Celadon Plate",
            3,
            "images/artifacts/Plate.png",
            [
                "Produced in Zhejiang's Longquan kilns, famed for jade-green glaze and carved lotus motifs.",
                "Celadon became China's most exported ware from the 12th to 14th centuries.",
                "Its translucent glaze was prized in Persia and the Islamic world.",
                "Identical shards have been excavated as far as Egypt and Kenya.",
            ],
        ),
        artifact(
            "white_ewer",
            "White Glazed Ewer",
            4,
            "images/artifacts/Ewer.png",
            [
                "Qingbai porcelain from Jingdezhen catered to export markets across Asia.",
                "Its light body and thin walls made it perfect for long maritime journeys.",
                "Used for wine or water, merging utility and elegance.",
                "Its flared rim reflects Tang and Song aesthetic ideals of purity.",
            ],
        ),
        artifact(
            "jade_arhat",
            "Jade Arhat Figurine",
            5,
            "images/artifacts/JadeFigure.png",
            [
                "A tiny jade carving carried for spiritual protection at sea.",
                "Arhats represent enlightened disciples in Buddhist tradition.",
                "Reflects the fusion of trade and belief along China's southern coasts.",
                "Carved from nephrite, valued for moral purity in Song China.",
            ],
        ),
        artifact(
            "gold_ring",
            "Gold Ring",
            6,
            "images/artifacts/Ring.png",
            [
                "Found near crew quarters, possibly a merchant's personal treasure.",
                "Some rings retained pearls; others held only empty bezels.",
                "Song-era goldwork reveals advanced metallurgy and sentimentality.",
                "Its small size hints at a woman's ring, perhaps a farewell gift.",
            ],
        ),
        artifact(
            "gold_necklace",
            "Gold Necklace",
            7,
            "images/artifacts/Necklace.png",
            [
                "Recovered from a sealed lacquer box in the cargo hold.",
                "Demonstrates fine filigree technique used in Song-court jewelry.",
                "Shows how valuables were packed and insured for maritime travel.",
                "Similar chains appear in 12th-century Song portraits of nobility.",
            ],
        ),
        artifact(
            "gilded_bracelet",
            "Gilded Dragon Bracelet",
            8,
            "images/artifacts/Bracelet.png",
            [
                "Two dragons chasing a pearl, a symbol of imperial power and protection.",
                "Scholars debate whether such pieces were bracelets or decorative fittings.",
                "Represents fusion of Chinese symbolism and maritime craftsmanship.",
                "Its meaning remains thrillingly unsettled between adornment and ritual.",
            ],
        ),
        artifact(
            "gilded_belt",
            "Gilded Belt Buckle",
            10,
            "images/artifacts/Belt.png",
            [
                "A 1.7-meter belt woven from gilded strands, echoing West Asian metalwork.",
                "Its clasp and scroll pattern reflect Tang-to-Song cross-cultural exchange.",
                "Combines Chinese craftsmanship with Persian aesthetic geometry.",
                "A masterpiece of East-West fashion along the Maritime Silk Road.",
            ],
        ),
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    fn single(key: &str) -> Artifact {
        artifact(key, "Thing", 2, "images/thing.png", ["a", "b", "c", "d"])
    }

    #[test]
    fn test_default_catalog_shape() {
        let catalog = ArtifactCatalog::default();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.fragment_count(), 40);
        assert_eq!(catalog.get("gilded_belt").unwrap().points, 10);
        assert_eq!(catalog.get("empty_box").unwrap().points, 0);
    }

    #[test]
    fn test_blurb_by_quadrant() {
        let a = single("thing");
        assert_eq!(a.blurb(1), Some("a"));
        assert_eq!(a.blurb(4), Some("d"));
        assert_eq!(a.blurb(0), None);
        assert_eq!(a.blurb(5), None);

        let catalog = ArtifactCatalog::new(vec![a]).unwrap();
        assert_eq!(catalog.blurb("thing", 2), Some("b"));
        assert_eq!(catalog.blurb("missing", 2), None);
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let result = ArtifactCatalog::new(vec![single("x"), single("x")]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_catalog() {
        assert!(ArtifactCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            [[artifacts]]
            key = "vase"
            name = "Blue Vase"
            points = 3
            image = "images/vase.png"
            blurbs = ["one", "two", "three", "four"]
        "#;
        let catalog = ArtifactCatalog::from_toml_str(toml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("vase").unwrap().blurb(3), Some("three"));
    }

    #[test]
    fn test_from_toml_requires_four_blurbs() {
        let toml = r#"
            [[artifacts]]
            key = "vase"
            name = "Blue Vase"
            points = 3
            image = "images/vase.png"
            blurbs = ["one", "two"]
        "#;
        assert!(ArtifactCatalog::from_toml_str(toml).is_err());
    }
}
