//! Feature markings carried by tile slots.
//!
//! This module contains:
//! - `FeatureFlags`, the per-slot bitset of feature kinds and modifiers
//! - `Slot`, the five feature-bearing positions of a tile
//! - `FeatureKind`, the claimable kinds a meeple can sit on
//! - `MeepleKind`, the token shape that goes with each claimable kind

use crate::game::GameError;
use crate::grid::Direction;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of features present on one slot of a tile.
    ///
    /// A slot may carry a combination, e.g. `ROAD | ROAD_END` for a road
    /// that stops at this tile. `SHIELD` only modifies a city and never
    /// decides compatibility on its own.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FeatureFlags: u8 {
        const FIELD = 1 << 0;
        const ROAD = 1 << 1;
        const CITY = 1 << 2;
        const MONASTERY = 1 << 3;
        const ROAD_INTERSECTION = 1 << 4;
        const ROAD_END = 1 << 5;
        const SHIELD = 1 << 6;
    }
}

impl FeatureFlags {
    /// Every flag that belongs to a road network
    pub const ROAD_FAMILY: FeatureFlags = FeatureFlags::ROAD
        .union(FeatureFlags::ROAD_INTERSECTION)
        .union(FeatureFlags::ROAD_END);

    /// Flags that stop a traversal at the starting slot
    pub const ROAD_TERMINALS: FeatureFlags =
        FeatureFlags::ROAD_INTERSECTION.union(FeatureFlags::ROAD_END);

    /// Flags a meeple may be placed on
    pub const CLAIMABLE: FeatureFlags = FeatureFlags::ROAD
        .union(FeatureFlags::CITY)
        .union(FeatureFlags::MONASTERY);
}

/// One of the five feature-bearing positions of a tile.
///
/// The discriminants match the slot indices used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    Center = 0,
    North = 1,
    East = 2,
    South = 3,
    West = 4,
}

impl Slot {
    /// All slots, center first
    pub const ALL: [Slot; 5] = [Slot::Center, Slot::North, Slot::East, Slot::South, Slot::West];

    /// The four edge slots in clockwise order
    pub const EDGES: [Slot; 4] = [Slot::North, Slot::East, Slot::South, Slot::West];

    /// Slot index (Center = 0 .. West = 4)
    pub const fn index(&self) -> u8 {
        *self as u8
    }

    /// Slot for an index, if in range
    pub const fn from_index(index: u8) -> Option<Slot> {
        match index {
            0 => Some(Slot::Center),
            1 => Some(Slot::North),
            2 => Some(Slot::East),
            3 => Some(Slot::South),
            4 => Some(Slot::West),
            _ => None,
        }
    }

    /// The edge slot facing this one across a shared border.
    ///
    /// For edge index `i` this is `((i + 1) mod 4) + 1`; the center has no
    /// opposite and maps to itself.
    pub const fn opposite(&self) -> Slot {
        match self {
            Slot::Center => Slot::Center,
            Slot::North => Slot::South,
            Slot::East => Slot::West,
            Slot::South => Slot::North,
            Slot::West => Slot::East,
        }
    }

    /// Direction an edge slot faces, `None` for the center
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Slot::Center => None,
            Slot::North => Some(Direction::North),
            Slot::East => Some(Direction::East),
            Slot::South => Some(Direction::South),
            Slot::West => Some(Direction::West),
        }
    }

    /// Edge slot facing a direction
    pub const fn from_direction(direction: Direction) -> Slot {
        match direction {
            Direction::North => Slot::North,
            Direction::East => Slot::East,
            Direction::South => Slot::South,
            Direction::West => Slot::West,
        }
    }

    pub const fn is_center(&self) -> bool {
        matches!(self, Slot::Center)
    }
}

impl TryFrom<u8> for Slot {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::from_index(value).ok_or(GameError::InvalidSlot(value))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> u8 {
        slot.index()
    }
}

/// A feature kind that can be claimed, completed and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Road,
    City,
    Monastery,
}

impl FeatureKind {
    /// The flag searched for when walking this kind's component
    pub const fn flag(&self) -> FeatureFlags {
        match self {
            FeatureKind::Road => FeatureFlags::ROAD,
            FeatureKind::City => FeatureFlags::CITY,
            FeatureKind::Monastery => FeatureFlags::MONASTERY,
        }
    }

    /// Claimable kind carried by a slot, if any.
    ///
    /// Monasteries only count on the center slot, and a center slot offers
    /// nothing else: roads and cities are claimed from their edges.
    pub fn for_slot(flags: FeatureFlags, slot: Slot) -> Option<FeatureKind> {
        if slot.is_center() {
            return flags
                .contains(FeatureFlags::MONASTERY)
                .then_some(FeatureKind::Monastery);
        }
        if flags.contains(FeatureFlags::CITY) {
            Some(FeatureKind::City)
        } else if flags.contains(FeatureFlags::ROAD) {
            Some(FeatureKind::Road)
        } else {
            None
        }
    }
}

impl TryFrom<FeatureFlags> for FeatureKind {
    type Error = GameError;

    /// Resolve the claimable kind of a flag set; anything else is a caller bug.
    fn try_from(flags: FeatureFlags) -> Result<Self, Self::Error> {
        if flags.contains(FeatureFlags::MONASTERY) {
            Ok(FeatureKind::Monastery)
        } else if flags.contains(FeatureFlags::CITY) {
            Ok(FeatureKind::City)
        } else if flags.contains(FeatureFlags::ROAD) {
            Ok(FeatureKind::Road)
        } else {
            Err(GameError::InvalidFeatureKind(flags.bits()))
        }
    }
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Road => write!(f, "road"),
            FeatureKind::City => write!(f, "city"),
            FeatureKind::Monastery => write!(f, "monastery"),
        }
    }
}

/// Shape of a meeple token, one per claimable kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeepleKind {
    /// Highwayman on a road
    Road,
    /// Knight in a city
    Knight,
    /// Bishop in a monastery
    Bishop,
}

impl From<FeatureKind> for MeepleKind {
    fn from(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Road => MeepleKind::Road,
            FeatureKind::City => MeepleKind::Knight,
            FeatureKind::Monastery => MeepleKind::Bishop,
        }
    }
}

impl From<MeepleKind> for FeatureKind {
    fn from(kind: MeepleKind) -> Self {
        match kind {
            MeepleKind::Road => FeatureKind::Road,
            MeepleKind::Knight => FeatureKind::City,
            MeepleKind::Bishop => FeatureKind::Monastery,
        }
    }
}
