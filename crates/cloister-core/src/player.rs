//! Player state: score and meeple supply.

use crate::meeple::PlayerColor;
use serde::{Deserialize, Serialize};

/// Seat index of a player (0-3)
pub type PlayerId = u8;

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// Points scored so far
    pub score: u32,
    /// Meeples still in the player's supply
    pub meeples: u32,
}

impl Player {
    /// Create a new player with a full meeple supply
    pub fn new(id: PlayerId, name: String, meeples: u32) -> Self {
        Self {
            id,
            name,
            color: PlayerColor::for_seat(id as usize),
            score: 0,
            meeples,
        }
    }

    pub fn has_meeple(&self) -> bool {
        self.meeples > 0
    }

    /// Take a meeple from the supply, returning false if none is left
    pub fn take_meeple(&mut self) -> bool {
        if self.meeples == 0 {
            return false;
        }
        self.meeples -= 1;
        true
    }

    /// Put a meeple back into the supply
    pub fn return_meeple(&mut self) {
        self.meeples += 1;
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player() {
        let player = Player::new(1, "Test".to_string(), 6);
        assert_eq!(player.color, PlayerColor::Blue);
        assert_eq!(player.score, 0);
        assert!(player.has_meeple());
    }

    #[test]
    fn test_meeple_supply() {
        let mut player = Player::new(0, "Test".to_string(), 1);
        assert!(player.take_meeple());
        assert!(!player.has_meeple());
        assert!(!player.take_meeple());
        assert_eq!(player.meeples, 0);

        player.return_meeple();
        assert_eq!(player.meeples, 1);
    }

    #[test]
    fn test_score_accumulates() {
        let mut player = Player::new(0, "Test".to_string(), 6);
        player.add_score(3);
        player.add_score(6);
        assert_eq!(player.score, 9);
    }
}
