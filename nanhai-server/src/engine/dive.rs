//! Dive transaction
//!
//! The in-memory half of a dive: given the loaded document and a player name,
//! claim one random fragment (or reset an exhausted pool), update scores and
//! apply the completion bonus. Loading, saving and broadcasting are done by
//! [`super::GameEngine`] around this function.

use nanhai_common::catalog::QUADRANTS;
use nanhai_common::{ArtifactCatalog, Fragment, FragmentPool, GameDocument, Result};
use rand::Rng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Bonus paid to every distinct finder of an artifact once all four quadrants are found
pub const COMPLETION_BONUS: u32 = 5;

/// Message returned when a dive regenerates the pool
pub const RESET_MESSAGE: &str = "All fragments recovered. The sea resets for a new dive.";

/// Result of one dive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiveOutcome {
    /// A fragment was claimed; `completed` names the artifact if this dive
    /// found its last missing quadrant
    Claimed {
        fragment: Fragment,
        completed: Option<String>,
    },

    /// The pool was exhausted and has been regenerated
    Reset,
}

impl DiveOutcome {
    pub fn message(&self) -> String {
        match self {
            DiveOutcome::Claimed { fragment, .. } => {
                format!("You found a fragment of \"{}\".", fragment.artifact_name)
            }
            DiveOutcome::Reset => RESET_MESSAGE.to_string(),
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, DiveOutcome::Reset)
    }
}

/// Run one dive for `name` against `doc`
///
/// The player is registered before anything else, so a first-time diver who
/// hits an exhausted pool is recorded before the reset discards the player list.
/// On reset the whole player list is dropped along with the old generation.
pub fn dive<R: Rng + ?Sized>(
    doc: &mut GameDocument,
    catalog: &ArtifactCatalog,
    name: &str,
    rng: &mut R,
) -> Result<DiveOutcome> {
    doc.players.find_or_create(name);

    let Some(id) = doc.fragments.draw(rng) else {
        info!(
            "Pool exhausted, regenerating {} fragments and clearing {} players",
            catalog.fragment_count(),
            doc.players.len()
        );
        doc.fragments = FragmentPool::generate(catalog);
        doc.players.clear();
        return Ok(DiveOutcome::Reset);
    };

    let fragment = doc.fragments.claim(id, name)?.clone();
    let player = doc.players.find_or_create(name);
    player.score = player.score.saturating_add(fragment.points);
    debug!(
        "{} found fragment {} ({} q{}) for {} points",
        name, fragment.id, fragment.artifact_key, fragment.quadrant, fragment.points
    );

    let completed = award_completion_bonus(doc, &fragment.artifact_key);

    Ok(DiveOutcome::Claimed {
        fragment,
        completed,
    })
}

/// Pay the completion bonus if the artifact now has all quadrants claimed
///
/// Called right after one of the artifact's fragments was claimed, so a full
/// count means this dive completed it.
fn award_completion_bonus(doc: &mut GameDocument, artifact_key: &str) -> Option<String> {
    let claimed: Vec<&Fragment> = doc.fragments.claimed_for_artifact(artifact_key).collect();
    if claimed.len() != usize::from(QUADRANTS) {
        return None;
    }

    let finders: HashSet<String> = claimed
        .iter()
        .filter_map(|f| f.found_by.clone())
        .collect();
    let credited = doc.players.award(&finders, COMPLETION_BONUS);
    info!(
        "Artifact {} completed, +{} to {} finder(s)",
        artifact_key, COMPLETION_BONUS, credited
    );

    Some(artifact_key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanhai_common::Artifact;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn single_artifact_catalog(points: u32) -> ArtifactCatalog {
        ArtifactCatalog::new(vec![Artifact {
            key: "vase".to_string(),
            name: "Blue Vase".to_string(),
            points,
            image: "images/vase.png".to_string(),
            blurbs: ["1", "2", "3", "4"].map(str::to_string),
        }])
        .unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_first_dive_registers_player() {
        let catalog = ArtifactCatalog::default();
        let mut doc = GameDocument::fresh(&catalog);

        let outcome = dive(&mut doc, &catalog, "ada", &mut rng()).unwrap();

        let DiveOutcome::Claimed { fragment, .. } = outcome else {
            panic!("expected a claim");
        };
        assert_eq!(fragment.found_by.as_deref(), Some("ada"));
        assert_eq!(doc.players.get("ada").unwrap().score, fragment.points);
        assert_eq!(doc.fragments.unclaimed_count(), 39);
    }

    #[test]
    fn test_solo_player_completes_and_resets() {
        let catalog = single_artifact_catalog(2);
        let mut doc = GameDocument::fresh(&catalog);
        let mut rng = rng();

        for i in 0..4 {
            let outcome = dive(&mut doc, &catalog, "A", &mut rng).unwrap();
            match outcome {
                DiveOutcome::Claimed { completed, .. } => {
                    assert_eq!(completed.is_some(), i == 3, "dive {}", i);
                }
                DiveOutcome::Reset => panic!("unexpected reset on dive {}", i),
            }
        }
        assert_eq!(doc.players.get("A").unwrap().score, 2 * 4 + 5);

        let fifth = dive(&mut doc, &catalog, "A", &mut rng).unwrap();
        assert!(fifth.is_reset());
        assert_eq!(fifth.message(), RESET_MESSAGE);
        assert_eq!(doc.fragments.unclaimed_count(), 4);
        assert!(doc.players.is_empty());
    }

    #[test]
    fn test_bonus_goes_to_every_finder() {
        let catalog = single_artifact_catalog(1);
        let mut doc = GameDocument::fresh(&catalog);
        let mut rng = rng();

        dive(&mut doc, &catalog, "A", &mut rng).unwrap();
        dive(&mut doc, &catalog, "A", &mut rng).unwrap();
        dive(&mut doc, &catalog, "B", &mut rng).unwrap();
        let last = dive(&mut doc, &catalog, "B", &mut rng).unwrap();

        match last {
            DiveOutcome::Claimed { completed, .. } => {
                assert_eq!(completed.as_deref(), Some("vase"));
            }
            DiveOutcome::Reset => panic!("expected a claim"),
        }
        assert_eq!(doc.players.get("A").unwrap().score, 2 + 5);
        assert_eq!(doc.players.get("B").unwrap().score, 2 + 5);
    }

    #[test]
    fn test_bonus_only_for_finders_of_that_artifact() {
        let catalog = single_artifact_catalog(1);
        let mut doc = GameDocument::fresh(&catalog);
        doc.players.find_or_create("bystander");
        let mut rng = rng();

        for _ in 0..4 {
            dive(&mut doc, &catalog, "A", &mut rng).unwrap();
        }

        assert_eq!(doc.players.get("bystander").unwrap().score, 0);
        assert_eq!(doc.players.get("A").unwrap().score, 4 + 5);
    }

    #[test]
    fn test_first_time_diver_on_exhausted_pool() {
        let catalog = single_artifact_catalog(1);
        let mut doc = GameDocument::fresh(&catalog);
        let mut rng = rng();
        for _ in 0..4 {
            dive(&mut doc, &catalog, "A", &mut rng).unwrap();
        }

        let outcome = dive(&mut doc, &catalog, "newcomer", &mut rng).unwrap();

        assert!(outcome.is_reset());
        assert!(doc.players.is_empty());
        assert!(doc.fragments.iter().all(|f| f.found_by.is_none()));
    }

    #[test]
    fn test_claim_message_names_artifact() {
        let catalog = single_artifact_catalog(1);
        let mut doc = GameDocument::fresh(&catalog);
        let outcome = dive(&mut doc, &catalog, "A", &mut rng()).unwrap();
        assert_eq!(outcome.message(), "You found a fragment of \"Blue Vase\".");
    }

    /// Score always equals points of fragments found plus bonuses earned
    #[test]
    fn test_scores_match_claims_and_bonuses() {
        let catalog = ArtifactCatalog::default();
        let mut doc = GameDocument::fresh(&catalog);
        let mut rng = StdRng::seed_from_u64(2024);
        let names = ["a", "b", "c", "d", "e"];
        let mut bonuses: HashMap<String, u32> = HashMap::new();

        for step in 0..catalog.fragment_count() {
            let name = names[step % names.len()];
            let outcome = dive(&mut doc, &catalog, name, &mut rng).unwrap();
            if let DiveOutcome::Claimed {
                completed: Some(key),
                ..
            } = outcome
            {
                let finders: HashSet<String> = doc
                    .fragments
                    .claimed_for_artifact(&key)
                    .filter_map(|f| f.found_by.clone())
                    .collect();
                for finder in finders {
                    *bonuses.entry(finder).or_default() += COMPLETION_BONUS;
                }
            }
        }

        assert!(doc.fragments.is_exhausted());
        for player in doc.players.all() {
            let found: u32 = doc
                .fragments
                .iter()
                .filter(|f| f.found_by.as_deref() == Some(player.name.as_str()))
                .map(|f| f.points)
                .sum();
            let bonus = bonuses.get(&player.name).copied().unwrap_or(0);
            assert_eq!(player.score, found + bonus, "player {}", player.name);
        }
    }
}
