//! Session configuration.
//!
//! Everything here is plain serde data so a host can load it from JSON.

use crate::deck::{standard_tiles, starter_template, TileCount};
use crate::tile::TileTemplate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Meeples each player starts with
pub const DEFAULT_MEEPLES_PER_PLAYER: u32 = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck has no tiles")]
    EmptyDeck,
}

/// Tile set used to build a session's deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Tile placed at the origin before the first turn
    pub starter: TileTemplate,
    /// Templates and their copy counts
    pub tiles: Vec<TileCount>,
}

impl DeckConfig {
    /// The built-in tile set
    pub fn standard() -> Self {
        Self {
            starter: starter_template(),
            tiles: standard_tiles(),
        }
    }

    /// Total number of drawable tiles
    pub fn total_tiles(&self) -> usize {
        self.tiles.iter().map(|t| t.count as usize).sum()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DeckConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.total_tiles() == 0 {
            return Err(ConfigError::EmptyDeck);
        }
        Ok(())
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Settings for one game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_meeples")]
    pub meeples_per_player: u32,
    /// Stop the game once this many tiles (starter included) are on the board
    #[serde(default)]
    pub max_tiles: Option<u32>,
    #[serde(default)]
    pub deck: DeckConfig,
}

fn default_meeples() -> u32 {
    DEFAULT_MEEPLES_PER_PLAYER
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.deck.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Same settings with a different deck
    pub fn with_deck(mut self, deck: DeckConfig) -> Self {
        self.deck = deck;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            meeples_per_player: DEFAULT_MEEPLES_PER_PLAYER,
            max_tiles: None,
            deck: DeckConfig::standard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureFlags;

    #[test]
    fn test_session_defaults_from_empty_json() {
        let config = SessionConfig::from_json_str("{}").unwrap();
        assert_eq!(config.meeples_per_player, 6);
        assert_eq!(config.max_tiles, None);
        assert_eq!(config.deck, DeckConfig::standard());
    }

    #[test]
    fn test_custom_deck_json() {
        let json = r#"{
            "meeples_per_player": 3,
            "max_tiles": 50,
            "deck": {
                "starter": {
                    "name": "start", "center": "ROAD",
                    "north": "CITY", "east": "ROAD", "south": "FIELD", "west": "ROAD"
                },
                "tiles": [
                    { "template": {
                        "name": "end", "art": "road_end.png", "center": "FIELD",
                        "north": "FIELD", "east": "FIELD", "south": "FIELD",
                        "west": "ROAD | ROAD_END"
                    }, "count": 2 }
                ]
            }
        }"#;
        let config = SessionConfig::from_json_str(json).unwrap();
        assert_eq!(config.meeples_per_player, 3);
        assert_eq!(config.max_tiles, Some(50));
        assert_eq!(config.deck.total_tiles(), 2);
        let end = &config.deck.tiles[0].template;
        assert_eq!(end.west, FeatureFlags::ROAD | FeatureFlags::ROAD_END);
        assert_eq!(end.art, "road_end.png");
        assert_eq!(config.deck.starter.art, "");
    }

    #[test]
    fn test_empty_deck_rejected() {
        let mut deck = DeckConfig::standard();
        deck.tiles.clear();
        let json = serde_json::to_string(&deck).unwrap();
        assert!(matches!(DeckConfig::from_json_str(&json), Err(ConfigError::EmptyDeck)));
    }
}
