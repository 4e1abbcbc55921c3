//! Tile definitions and placed tile instances.
//!
//! A `TileTemplate` describes what is printed on a tile. A `PlacedTile`
//! binds a copy of a template to a cell and a fixed rotation.

use crate::feature::{FeatureFlags, Slot};
use crate::game::GameError;
use crate::grid::{Direction, GridPos};
use serde::{Deserialize, Serialize};

/// Stable arena index of a placed tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable definition of a tile's five feature slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    /// Short identifier used in logs and deck files
    pub name: String,
    /// Display reference for the client (sprite key)
    #[serde(default)]
    pub art: String,
    pub center: FeatureFlags,
    pub north: FeatureFlags,
    pub east: FeatureFlags,
    pub south: FeatureFlags,
    pub west: FeatureFlags,
}

impl TileTemplate {
    /// Create a template from its center and N/E/S/W edges
    pub fn new(
        name: impl Into<String>,
        center: FeatureFlags,
        [north, east, south, west]: [FeatureFlags; 4],
    ) -> Self {
        let name = name.into();
        Self {
            art: name.clone(),
            name,
            center,
            north,
            east,
            south,
            west,
        }
    }

    /// Unrotated edge facing a direction
    pub fn edge(&self, direction: Direction) -> FeatureFlags {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Unrotated flags of a slot
    pub fn feature(&self, slot: Slot) -> FeatureFlags {
        match slot.direction() {
            None => self.center,
            Some(direction) => self.edge(direction),
        }
    }

    /// Edge facing `direction` once the template is turned by `rotation`.
    ///
    /// Each clockwise quarter turn moves every edge one step clockwise, so
    /// the edge now facing `direction` is the one that was `rotation` steps
    /// counter-clockwise from it.
    pub fn rotated_edge(&self, rotation: Rotation, direction: Direction) -> FeatureFlags {
        let turns = rotation.quarter_turns() as usize;
        self.edge(Direction::from_index(direction.index() + 4 - turns))
    }

    /// Whether any slot carries a shield
    pub fn has_shield(&self) -> bool {
        Slot::ALL
            .iter()
            .any(|&slot| self.feature(slot).contains(FeatureFlags::SHIELD))
    }
}

/// Number of clockwise quarter turns applied to a template (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);

    /// All four rotation states
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    /// Create a rotation, rejecting values outside 0-3
    pub const fn new(quarter_turns: u8) -> Option<Rotation> {
        if quarter_turns < 4 {
            Some(Rotation(quarter_turns))
        } else {
            None
        }
    }

    pub const fn quarter_turns(&self) -> u8 {
        self.0
    }

    pub const fn degrees(&self) -> u16 {
        self.0 as u16 * 90
    }
}

impl TryFrom<u8> for Rotation {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rotation::new(value).ok_or(GameError::InvalidRotation(value))
    }
}

impl From<Rotation> for u8 {
    fn from(rotation: Rotation) -> u8 {
        rotation.0
    }
}

/// A template bound to a board cell with a fixed rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub id: TileId,
    pub template: TileTemplate,
    pub position: GridPos,
    pub rotation: Rotation,
}

impl PlacedTile {
    pub fn new(id: TileId, template: TileTemplate, position: GridPos, rotation: Rotation) -> Self {
        Self {
            id,
            template,
            position,
            rotation,
        }
    }

    /// Current edge facing a direction after rotation
    pub fn edge(&self, direction: Direction) -> FeatureFlags {
        self.template.rotated_edge(self.rotation, direction)
    }

    /// Current flags of a slot; the center never rotates
    pub fn feature(&self, slot: Slot) -> FeatureFlags {
        match slot.direction() {
            None => self.template.center,
            Some(direction) => self.edge(direction),
        }
    }

    pub fn center(&self) -> FeatureFlags {
        self.template.center
    }

    /// All five slots with their current flags, center first
    pub fn features(&self) -> [(Slot, FeatureFlags); 5] {
        Slot::ALL.map(|slot| (slot, self.feature(slot)))
    }

    pub fn has_shield(&self) -> bool {
        self.template.has_shield()
    }
}
