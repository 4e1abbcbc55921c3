//! Connected feature traversal across placed tiles.
//!
//! A feature component is the closure of tile slots reachable from a start
//! slot through the tile's own center and across shared borders, keeping
//! only slots whose flags intersect the searched kind. Roads and cities form
//! loops, so the walk keeps an explicit visited set and stack.

use crate::board::Board;
use crate::feature::{FeatureFlags, Slot};
use crate::tile::TileId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// One node of the feature graph: a slot on a placed tile.
///
/// Identity is `(tile, slot)`. The flags are carried along for callers but
/// take no part in equality, ordering or hashing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TileFeatureKey {
    pub tile: TileId,
    pub flags: FeatureFlags,
    pub slot: Slot,
}

impl TileFeatureKey {
    pub fn new(tile: TileId, flags: FeatureFlags, slot: Slot) -> Self {
        Self { tile, flags, slot }
    }

    /// Key for a slot of a placed tile, reading its current flags
    pub fn at(board: &Board, tile: TileId, slot: Slot) -> Option<Self> {
        let placed = board.tile(tile)?;
        Some(Self::new(tile, placed.feature(slot), slot))
    }
}

impl PartialEq for TileFeatureKey {
    fn eq(&self, other: &Self) -> bool {
        self.tile == other.tile && self.slot == other.slot
    }
}

impl Eq for TileFeatureKey {}

impl Hash for TileFeatureKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tile.hash(state);
        self.slot.hash(state);
    }
}

impl PartialOrd for TileFeatureKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileFeatureKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.tile, self.slot).cmp(&(other.tile, other.slot))
    }
}

/// Collect every slot connected to `start` for the searched `kind`.
///
/// When `kind` itself carries `ROAD_END` or `ROAD_INTERSECTION` the start
/// slot is treated as a closed leaf and is the only member. Flags met along
/// the way never stop the walk; a road stops at a junction because the
/// junction's center carries no `ROAD`.
pub fn connected_component(
    board: &Board,
    start: TileFeatureKey,
    kind: FeatureFlags,
) -> HashSet<TileFeatureKey> {
    let mut visited = HashSet::new();
    visited.insert(start);

    if kind.intersects(FeatureFlags::ROAD_TERMINALS) {
        return visited;
    }

    let mut stack = vec![start];
    while let Some(key) = stack.pop() {
        let Some(tile) = board.tile(key.tile) else {
            continue;
        };

        let mut visit = |next: TileFeatureKey, visited: &mut HashSet<TileFeatureKey>| {
            if next.flags.intersects(kind) && visited.insert(next) {
                stack.push(next);
            }
        };

        match key.slot.direction() {
            None => {
                for slot in Slot::EDGES {
                    visit(TileFeatureKey::new(key.tile, tile.feature(slot), slot), &mut visited);
                }
            }
            Some(direction) => {
                visit(
                    TileFeatureKey::new(key.tile, tile.center(), Slot::Center),
                    &mut visited,
                );

                if let Some(across) = board
                    .neighbor(tile.position, direction)
                    .and_then(|id| board.tile(id))
                {
                    let mirrored = key.slot.opposite();
                    visit(
                        TileFeatureKey::new(across.id, across.feature(mirrored), mirrored),
                        &mut visited,
                    );
                }
            }
        }
    }

    visited
}

/// Distinct tiles a component spans, in placement order
pub fn component_tiles(component: &HashSet<TileFeatureKey>) -> Vec<TileId> {
    let mut tiles: Vec<TileId> = component.iter().map(|key| key.tile).collect();
    tiles.sort();
    tiles.dedup();
    tiles
}
