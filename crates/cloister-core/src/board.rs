//! Game board representation: the placed tiles and their positions.
//!
//! This module contains:
//! - The tile arena (`TileId` indexes into it) and the position map
//! - Open position queries for highlighting and deck validity
//! - Placement validation and mutation
//!
//! Tiles are never removed once placed, so a `TileId` stays valid for the
//! lifetime of the board.

use crate::compat::compatible;
use crate::grid::{Direction, GridPos};
use crate::tile::{PlacedTile, Rotation, TileId, TileTemplate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Reasons a tile cannot go where it was asked to
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlacementError {
    #[error("Position {0} is already occupied")]
    PositionOccupied(GridPos),

    #[error("No tile to place")]
    NoTemplate,

    #[error("Position {0} does not touch any placed tile")]
    NotAdjacent(GridPos),

    #[error("Edge mismatch with the tile to the {direction:?} of {position}")]
    EdgeMismatch {
        position: GridPos,
        direction: Direction,
    },
}

/// The board: every placed tile, addressable by id or position
#[derive(Debug, Clone, Default)]
pub struct Board {
    /// Placed tiles indexed by `TileId`
    tiles: Vec<PlacedTile>,
    /// Which tile sits on each occupied cell
    positions: HashMap<GridPos, TileId>,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Query Methods ====================

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of placed tiles
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All placed tiles in placement order
    pub fn tiles(&self) -> &[PlacedTile] {
        &self.tiles
    }

    /// Get a tile by id
    pub fn tile(&self, id: TileId) -> Option<&PlacedTile> {
        self.tiles.get(id.0 as usize)
    }

    /// Get the tile on a cell
    pub fn get_tile(&self, position: &GridPos) -> Option<&PlacedTile> {
        self.positions.get(position).and_then(|&id| self.tile(id))
    }

    pub fn tile_id_at(&self, position: &GridPos) -> Option<TileId> {
        self.positions.get(position).copied()
    }

    pub fn is_occupied(&self, position: &GridPos) -> bool {
        self.positions.contains_key(position)
    }

    /// The tile next to a cell in a direction
    pub fn neighbor(&self, position: GridPos, direction: Direction) -> Option<TileId> {
        self.tile_id_at(&position.neighbor(direction))
    }

    /// Every empty cell that shares an edge with at least one placed tile
    pub fn open_positions(&self) -> HashSet<GridPos> {
        let mut open = HashSet::new();
        for position in self.positions.keys() {
            for neighbor in position.neighbors() {
                if !self.is_occupied(&neighbor) {
                    open.insert(neighbor);
                }
            }
        }
        open
    }

    // ==================== Validation Methods ====================

    /// Check that a template, turned by `rotation`, may go on `position`.
    ///
    /// Each present neighbor is checked on its own; any single mismatch
    /// rejects the placement.
    pub fn check_placement(
        &self,
        position: GridPos,
        template: &TileTemplate,
        rotation: Rotation,
    ) -> Result<(), PlacementError> {
        if self.is_occupied(&position) {
            return Err(PlacementError::PositionOccupied(position));
        }

        let mut has_neighbor = false;
        for direction in Direction::ALL {
            let Some(adjacent) = self
                .neighbor(position, direction)
                .and_then(|id| self.tile(id))
            else {
                continue;
            };
            has_neighbor = true;

            let existing_edge = adjacent.edge(direction.opposite());
            let candidate_edge = template.rotated_edge(rotation, direction);
            if !compatible(existing_edge, candidate_edge, template.center, adjacent.center()) {
                return Err(PlacementError::EdgeMismatch {
                    position,
                    direction,
                });
            }
        }

        if !has_neighbor && !self.is_empty() {
            return Err(PlacementError::NotAdjacent(position));
        }
        Ok(())
    }

    /// Every legal `(position, rotation)` for a template, in a stable order
    pub fn legal_placements(&self, template: &TileTemplate) -> Vec<(GridPos, Rotation)> {
        let mut positions: Vec<GridPos> = self.open_positions().into_iter().collect();
        positions.sort();

        let mut placements = Vec::new();
        for position in positions {
            for rotation in Rotation::ALL {
                if self.check_placement(position, template, rotation).is_ok() {
                    placements.push((position, rotation));
                }
            }
        }
        placements
    }

    /// Whether a template fits anywhere on the board in any rotation
    pub fn has_legal_placement(&self, template: &TileTemplate) -> bool {
        self.open_positions().into_iter().any(|position| {
            Rotation::ALL
                .iter()
                .any(|&rotation| self.check_placement(position, template, rotation).is_ok())
        })
    }

    // ==================== Mutation Methods ====================

    /// Place the starter tile at the origin, skipping compatibility checks
    pub fn place_starter(&mut self, template: TileTemplate) -> Result<TileId, PlacementError> {
        if !self.is_empty() {
            return Err(PlacementError::PositionOccupied(GridPos::ORIGIN));
        }
        Ok(self.insert(GridPos::ORIGIN, template, Rotation::NONE))
    }

    /// Validate and place a tile
    pub fn place(
        &mut self,
        position: GridPos,
        template: Option<TileTemplate>,
        rotation: Rotation,
    ) -> Result<TileId, PlacementError> {
        if self.is_occupied(&position) {
            return Err(PlacementError::PositionOccupied(position));
        }
        let template = template.ok_or(PlacementError::NoTemplate)?;
        self.check_placement(position, &template, rotation)?;
        Ok(self.insert(position, template, rotation))
    }

    fn insert(&mut self, position: GridPos, template: TileTemplate, rotation: Rotation) -> TileId {
        let id = TileId(self.tiles.len() as u32);
        debug!(
            tile = %id,
            %position,
            rotation = rotation.degrees(),
            name = %template.name,
            "Tile placed"
        );
        self.tiles.push(PlacedTile::new(id, template, position, rotation));
        self.positions.insert(position, id);
        id
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::feature::FeatureFlags;

    const F: FeatureFlags = FeatureFlags::FIELD;
    const R: FeatureFlags = FeatureFlags::ROAD;
    const C: FeatureFlags = FeatureFlags::CITY;

    pub(crate) fn field() -> TileTemplate {
        TileTemplate::new("field", F, [F, F, F, F])
    }

    fn city_cap() -> TileTemplate {
        TileTemplate::new("city-cap", F, [C, F, F, F])
    }

    #[test]
    fn test_starter_bypasses_checks() {
        let mut board = Board::new();
        let id = board.place_starter(city_cap()).unwrap();
        assert_eq!(id, TileId(0));
        assert_eq!(board.get_tile(&GridPos::ORIGIN).unwrap().id, id);
        assert!(board.place_starter(field()).is_err());
    }

    #[test]
    fn test_open_positions() {
        let mut board = Board::new();
        assert!(board.open_positions().is_empty());

        board.place_starter(field()).unwrap();
        let open = board.open_positions();
        assert_eq!(open.len(), 4);
        assert!(open.contains(&GridPos::new(0, 1)));

        board.place(GridPos::new(1, 0), Some(field()), Rotation::NONE).unwrap();
        let open = board.open_positions();
        assert_eq!(open.len(), 6);
        assert!(!open.contains(&GridPos::new(1, 0)));
    }

    #[test]
    fn test_place_rejects_occupied() {
        let mut board = Board::new();
        board.place_starter(field()).unwrap();
        assert_eq!(
            board.place(GridPos::ORIGIN, Some(field()), Rotation::NONE),
            Err(PlacementError::PositionOccupied(GridPos::ORIGIN))
        );
    }

    #[test]
    fn test_place_requires_template() {
        let mut board = Board::new();
        board.place_starter(field()).unwrap();
        assert_eq!(
            board.place(GridPos::new(0, 1), None, Rotation::NONE),
            Err(PlacementError::NoTemplate)
        );
    }

    #[test]
    fn test_place_requires_adjacency() {
        let mut board = Board::new();
        board.place_starter(field()).unwrap();
        assert_eq!(
            board.place(GridPos::new(5, 5), Some(field()), Rotation::NONE),
            Err(PlacementError::NotAdjacent(GridPos::new(5, 5)))
        );
    }

    #[test]
    fn test_rotation_decides_fit() {
        let mut board = Board::new();
        board.place_starter(city_cap()).unwrap();

        // City cap above must face its city south: half turn
        let above = GridPos::new(0, 1);
        assert!(matches!(
            board.place(above, Some(city_cap()), Rotation::NONE),
            Err(PlacementError::EdgeMismatch {
                direction: Direction::South,
                ..
            })
        ));
        let id = board
            .place(above, Some(city_cap()), Rotation::new(2).unwrap())
            .unwrap();
        assert_eq!(board.neighbor(GridPos::ORIGIN, Direction::North), Some(id));
    }

    #[test]
    fn test_every_neighbor_is_checked() {
        let mut board = Board::new();
        board.place_starter(field()).unwrap();
        board.place(GridPos::new(1, 0), Some(field()), Rotation::NONE).unwrap();
        board.place(GridPos::new(1, 1), Some(field()), Rotation::NONE).unwrap();

        // (0, 1) touches the starter (field) and (1, 1) (field): a road
        // west/east edge fails one of them
        let road_east = TileTemplate::new("road-east", R, [F, R, F, F]);
        assert!(board.place(GridPos::new(0, 1), Some(road_east), Rotation::NONE).is_err());
    }

    #[test]
    fn test_legal_placements_cover_rotations() {
        let mut board = Board::new();
        board.place_starter(city_cap()).unwrap();

        let placements = board.legal_placements(&city_cap());
        // Only the cell above can host a city edge against the starter
        assert!(placements.contains(&(GridPos::new(0, 1), Rotation::new(2).unwrap())));
        assert!(!placements.contains(&(GridPos::new(0, 1), Rotation::NONE)));
        assert!(placements
            .iter()
            .all(|(pos, rot)| board.check_placement(*pos, &city_cap(), *rot).is_ok()));
        assert!(board.has_legal_placement(&city_cap()));
    }

    #[test]
    fn test_no_legal_placement_detected() {
        let mut board = Board::new();
        board.place_starter(TileTemplate::new("all-city", C, [C, C, C, C])).unwrap();
        assert!(!board.has_legal_placement(&field()));
        assert!(board.legal_placements(&field()).is_empty());
    }
}
