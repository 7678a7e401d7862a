//! Player registry
//!
//! Name-keyed players and their scores. Names are matched exactly
//! (case-sensitive); callers trim input before it reaches the registry.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A registered player and their score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub score: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
        }
    }
}

/// All players, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Return the existing player or insert one with score 0
    pub fn find_or_create(&mut self, name: &str) -> &mut Player {
        match self.players.iter().position(|p| p.name == name) {
            Some(index) => &mut self.players[index],
            None => {
                self.players.push(Player::new(name));
                let last = self.players.len() - 1;
                &mut self.players[last]
            }
        }
    }

    /// Add `points` to every registered player whose name is in `names`
    ///
    /// Returns how many players were credited. Unknown names are skipped.
    pub fn award(&mut self, names: &HashSet<String>, points: u32) -> usize {
        let mut credited = 0;
        for player in self.players.iter_mut().filter(|p| names.contains(&p.name)) {
            player.score = player.score.saturating_add(points);
            credited += 1;
        }
        credited
    }

    /// Leaderboard snapshot
    pub fn all(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Drop every player (pool reset)
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_or_create_inserts_once() {
        let mut registry = PlayerRegistry::new();

        registry.find_or_create("Ada").score += 3;
        let again = registry.find_or_create("Ada");

        assert_eq!(again.score, 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = PlayerRegistry::new();
        registry.find_or_create("ada");
        registry.find_or_create("Ada");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_award_matches_by_name() {
        let mut registry = PlayerRegistry::new();
        registry.find_or_create("a").score = 1;
        registry.find_or_create("b").score = 2;
        registry.find_or_create("c");

        let names = HashSet::from(["a".to_string(), "b".to_string(), "ghost".to_string()]);
        let credited = registry.award(&names, 5);

        assert_eq!(credited, 2);
        assert_eq!(registry.get("a").unwrap().score, 6);
        assert_eq!(registry.get("b").unwrap().score, 7);
        assert_eq!(registry.get("c").unwrap().score, 0);
        assert!(!registry.contains("ghost"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = PlayerRegistry::new();
        for name in ["x", "y", "z"] {
            registry.find_or_create(name);
        }
        let names: Vec<&str> = registry.all().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_clear() {
        let mut registry = PlayerRegistry::new();
        registry.find_or_create("x");
        registry.clear();
        assert!(registry.is_empty());
    }
}
