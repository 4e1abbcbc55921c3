//! Completion checks for discovered feature components.

use crate::board::Board;
use crate::feature::{FeatureKind, Slot};
use crate::graph::{connected_component, TileFeatureKey};
use crate::grid::GridPos;
use std::collections::HashSet;

/// Whether every cell around a monastery holds a tile
pub fn is_monastery_complete(board: &Board, position: GridPos) -> bool {
    position
        .surrounding()
        .iter()
        .all(|cell| board.is_occupied(cell))
}

/// Occupied cells of the 3x3 block centered on `position`, itself included
pub fn monastery_occupancy(board: &Board, position: GridPos) -> u32 {
    let around = position
        .surrounding()
        .iter()
        .filter(|cell| board.is_occupied(cell))
        .count() as u32;
    around + u32::from(board.is_occupied(&position))
}

/// Whether a road or city component has no open border left.
///
/// Every edge slot in the component needs a tile across it. Center slots
/// impose nothing.
pub fn is_component_complete(board: &Board, component: &HashSet<TileFeatureKey>) -> bool {
    component.iter().all(|key| {
        let Some(direction) = key.slot.direction() else {
            return true;
        };
        board
            .tile(key.tile)
            .map(|tile| board.neighbor(tile.position, direction).is_some())
            .unwrap_or(false)
    })
}

/// Whether the feature of `kind` containing `start` is closed
pub fn is_complete(board: &Board, start: TileFeatureKey, kind: FeatureKind) -> bool {
    match kind {
        FeatureKind::Monastery => board
            .tile(start.tile)
            .map(|tile| is_monastery_complete(board, tile.position))
            .unwrap_or(false),
        FeatureKind::Road | FeatureKind::City => {
            let component = connected_component(board, start, kind.flag());
            is_component_complete(board, &component)
        }
    }
}

/// Key of a tile's monastery, if its center carries one
pub fn monastery_key(board: &Board, position: &GridPos) -> Option<TileFeatureKey> {
    let tile = board.get_tile(position)?;
    FeatureKind::for_slot(tile.center(), Slot::Center)
        .filter(|kind| *kind == FeatureKind::Monastery)
        .map(|_| TileFeatureKey::new(tile.id, tile.center(), Slot::Center))
}
