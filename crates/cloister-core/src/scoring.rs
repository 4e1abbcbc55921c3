//! Point values for completed and unfinished features.

use crate::board::Board;
use crate::feature::FeatureKind;
use crate::graph::{component_tiles, TileFeatureKey};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flat score of a completed monastery
pub const MONASTERY_SCORE: u32 = 9;

/// Points per tile of a completed city
const CITY_TILE_POINTS: u32 = 2;

/// Bonus per shield tile of a completed city
const SHIELD_BONUS: u32 = 2;

/// What a feature's score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBasis {
    /// Distinct tiles in the component; for a monastery, occupied cells of its 3x3 block
    pub tiles: u32,
    /// Component tiles carrying a shield
    pub shields: u32,
}

impl ScoreBasis {
    pub fn new(tiles: u32, shields: u32) -> Self {
        Self { tiles, shields }
    }

    /// Count the tiles and shields of a road or city component
    pub fn of_component(board: &Board, component: &HashSet<TileFeatureKey>) -> Self {
        let tiles = component_tiles(component);
        let shields = tiles
            .iter()
            .filter_map(|&id| board.tile(id))
            .filter(|tile| tile.has_shield())
            .count() as u32;
        Self::new(tiles.len() as u32, shields)
    }
}

/// Score a feature.
///
/// `end_game` selects the values for features still open when the game
/// stops: cities drop to one point per tile and half the shield bonus, and
/// monasteries count their occupied cells.
pub fn score(kind: FeatureKind, basis: ScoreBasis, end_game: bool) -> u32 {
    match (kind, end_game) {
        (FeatureKind::Road, _) => basis.tiles,
        (FeatureKind::City, false) => basis.tiles * CITY_TILE_POINTS + basis.shields * SHIELD_BONUS,
        (FeatureKind::City, true) => basis.tiles + (basis.shields * SHIELD_BONUS) / 2,
        (FeatureKind::Monastery, false) => MONASTERY_SCORE,
        (FeatureKind::Monastery, true) => basis.tiles,
    }
}
