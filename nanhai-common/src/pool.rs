//! Fragment pool
//!
//! One generation of claimable fragments: every (artifact, quadrant) pair of the
//! catalog, each claimable exactly once until the whole pool is regenerated.

use crate::catalog::{ArtifactCatalog, QUADRANTS};
use crate::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One quadrant of one artifact
///
/// Artifact display fields are copied in at generation time so the stored
/// document is exactly what clients render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    pub id: u32,
    pub artifact_key: String,
    pub artifact_name: String,
    pub blurb: String,
    pub image: String,
    pub quadrant: u8,
    pub points: u32,
    /// Claiming player, `null` while unclaimed
    pub found_by: Option<String>,
}

impl Fragment {
    pub fn is_claimed(&self) -> bool {
        self.found_by.is_some()
    }
}

/// The current fragment generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentPool {
    fragments: Vec<Fragment>,
}

impl FragmentPool {
    /// Generate a fresh, fully unclaimed pool
    ///
    /// Ids run sequentially from 1 in catalog order, quadrants 1..=4 per artifact.
    pub fn generate(catalog: &ArtifactCatalog) -> Self {
        let mut fragments = Vec::with_capacity(catalog.fragment_count());
        let mut id = 1;
        for artifact in catalog.iter() {
            for quadrant in 1..=QUADRANTS {
                fragments.push(Fragment {
                    id,
                    artifact_key: artifact.key.clone(),
                    artifact_name: artifact.name.clone(),
                    blurb: artifact.blurb(quadrant).unwrap_or_default().to_string(),
                    image: artifact.image.clone(),
                    quadrant,
                    points: artifact.points,
                    found_by: None,
                });
                id += 1;
            }
        }
        Self { fragments }
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    /// Fragments nobody has claimed in this generation
    pub fn unclaimed(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(|f| !f.is_claimed())
    }

    pub fn unclaimed_count(&self) -> usize {
        self.unclaimed().count()
    }

    /// True once every fragment of the generation has been claimed
    pub fn is_exhausted(&self) -> bool {
        self.unclaimed().next().is_none()
    }

    /// Uniformly pick the id of one unclaimed fragment
    ///
    /// Point value plays no part in the choice.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        let candidates: Vec<u32> = self.unclaimed().map(|f| f.id).collect();
        candidates.choose(rng).copied()
    }

    /// Mark a fragment as found by `player`
    ///
    /// The fragment must exist and be unclaimed; callers draw ids from
    /// [`FragmentPool::draw`], so a violation is an internal error.
    pub fn claim(&mut self, id: u32, player: &str) -> Result<&Fragment> {
        let fragment = self
            .fragments
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::Internal(format!("fragment {} does not exist", id)))?;

        if let Some(owner) = &fragment.found_by {
            return Err(Error::Internal(format!(
                "fragment {} already claimed by '{}'",
                id, owner
            )));
        }

        fragment.found_by = Some(player.to_string());
        Ok(&*fragment)
    }

    /// Claimed fragments belonging to one artifact
    pub fn claimed_for_artifact<'a>(
        &'a self,
        artifact_key: &'a str,
    ) -> impl Iterator<Item = &'a Fragment> + 'a {
        self.fragments
            .iter()
            .filter(move |f| f.artifact_key == artifact_key && f.is_claimed())
    }
}
