//! The draw pile: weighted template counts, shuffling and drawing.
//!
//! The pile holds independent copies of templates. A tile's rotation is
//! tracked per placement, never on the template itself.

use crate::config::DeckConfig;
use crate::feature::FeatureFlags;
use crate::tile::TileTemplate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A template together with how many copies go into the deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileCount {
    pub template: TileTemplate,
    pub count: u32,
}

impl TileCount {
    pub fn new(template: TileTemplate, count: u32) -> Self {
        Self { template, count }
    }
}

/// Shuffled pile of templates still to be drawn
#[derive(Debug, Clone, Default)]
pub struct Deck {
    tiles: Vec<TileTemplate>,
}

impl Deck {
    /// Expand the configured counts into individual copies (unshuffled)
    pub fn from_config(config: &DeckConfig) -> Self {
        let mut tiles = Vec::new();
        for entry in &config.tiles {
            tiles.extend(std::iter::repeat(entry.template.clone()).take(entry.count as usize));
        }
        debug!(size = tiles.len(), "Loaded tile deck");
        Self { tiles }
    }

    /// Build a deck from an explicit draw order (first element drawn first)
    pub fn from_tiles(tiles: Vec<TileTemplate>) -> Self {
        Self { tiles }
    }

    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Take the top template
    pub fn draw(&mut self) -> Option<TileTemplate> {
        if self.tiles.is_empty() {
            None
        } else {
            Some(self.tiles.remove(0))
        }
    }

    /// Take the first template, in draw order, accepted by `playable`.
    ///
    /// Templates passed over stay in the deck in their original order.
    pub fn draw_playable<F>(&mut self, mut playable: F) -> Option<TileTemplate>
    where
        F: FnMut(&TileTemplate) -> bool,
    {
        let index = self.tiles.iter().position(|t| playable(t))?;
        if index > 0 {
            debug!(skipped = index, "Passed over unplaceable tiles");
        }
        Some(self.tiles.remove(index))
    }

    /// Remaining templates in draw order
    pub fn remaining(&self) -> &[TileTemplate] {
        &self.tiles
    }
}

const F: FeatureFlags = FeatureFlags::FIELD;
const R: FeatureFlags = FeatureFlags::ROAD;
const C: FeatureFlags = FeatureFlags::CITY;
const M: FeatureFlags = FeatureFlags::MONASTERY;
const X: FeatureFlags = FeatureFlags::ROAD_INTERSECTION;
const CS: FeatureFlags = FeatureFlags::CITY.union(FeatureFlags::SHIELD);
/// A road that stops on this tile
const RE: FeatureFlags = FeatureFlags::ROAD.union(FeatureFlags::ROAD_END);

/// The starter tile: city cap to the north, road running east-west
pub fn starter_template() -> TileTemplate {
    TileTemplate::new("city-cap-straight-road", R, [C, R, F, R])
}

/// The built-in tile set (72 tiles including the starter)
pub fn standard_tiles() -> Vec<TileCount> {
    let t = |name: &str, center, edges, count| {
        TileCount::new(TileTemplate::new(name, center, edges), count)
    };
    vec![
        t("monastery", M, [F, F, F, F], 4),
        t("monastery-road", M, [F, F, RE, F], 2),
        t("city-full", CS, [CS, CS, CS, CS], 1),
        t("city-three", C, [C, C, F, C], 3),
        t("city-three-shield", CS, [CS, CS, F, CS], 1),
        t("city-three-road", C, [C, C, RE, C], 1),
        t("city-three-road-shield", CS, [CS, CS, RE, CS], 2),
        t("city-corner", C, [C, C, F, F], 3),
        t("city-corner-shield", CS, [CS, CS, F, F], 2),
        t("city-corner-road", C | R, [C, C, R, R], 3),
        t("city-corner-road-shield", CS | R, [CS, CS, R, R], 2),
        t("city-tube", C, [F, C, F, C], 1),
        t("city-tube-shield", CS, [F, CS, F, CS], 2),
        t("city-caps-opposite", F, [C, F, C, F], 3),
        t("city-caps-adjacent", F, [C, C, F, F], 2),
        t("city-cap", F, [C, F, F, F], 5),
        t("city-cap-curve-right", R, [C, R, R, F], 3),
        t("city-cap-curve-left", R, [C, F, R, R], 3),
        t("city-cap-junction", X, [C, RE, RE, RE], 3),
        t("city-cap-straight-road", R, [C, R, F, R], 3),
        t("road-straight", R, [R, F, R, F], 8),
        t("road-curve", R, [F, F, R, R], 9),
        t("road-junction", X, [F, RE, RE, RE], 4),
        t("road-crossing", X, [RE, RE, RE, RE], 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_deck_size() {
        let deck = Deck::from_config(&DeckConfig::standard());
        assert_eq!(deck.len(), 71, "71 drawable tiles plus the starter");
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let config = DeckConfig::standard();
        let mut a = Deck::from_config(&config);
        let mut b = Deck::from_config(&config);
        a.shuffle(&mut StdRng::seed_from_u64(7));
        b.shuffle(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.remaining(), b.remaining());
    }

    #[test]
    fn test_draw_playable_keeps_skipped_tiles() {
        let first = TileTemplate::new("a", F, [F, F, F, F]);
        let second = TileTemplate::new("b", M, [F, F, F, F]);
        let third = TileTemplate::new("c", R, [R, F, R, F]);
        let mut deck = Deck::from_tiles(vec![first.clone(), second.clone(), third.clone()]);

        let drawn = deck.draw_playable(|t| t.center == R).unwrap();
        assert_eq!(drawn, third);
        assert_eq!(deck.remaining(), &[first.clone(), second]);

        assert!(deck.draw_playable(|t| t.center == X).is_none());
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.draw(), Some(first));
    }

    #[test]
    fn test_every_standard_tile_has_features_on_all_slots() {
        for entry in standard_tiles() {
            for dir in crate::grid::Direction::ALL {
                assert!(!entry.template.edge(dir).is_empty(), "{}", entry.template.name);
            }
            assert!(!entry.template.center.is_empty(), "{}", entry.template.name);
        }
    }
}
