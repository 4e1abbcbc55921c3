//! Game actions that players can take.
//!
//! This module defines all possible actions in the game and the events
//! that result from those actions. Events are returned from every mutating
//! call in the order they happened.

use crate::feature::{FeatureKind, Slot};
use crate::grid::GridPos;
use crate::meeple::{MeepleData, MeepleId};
use crate::player::PlayerId;
use crate::tile::{Rotation, TileId, TileTemplate};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Place the drawn tile
    PlaceTile { position: GridPos, rotation: Rotation },

    /// Claim one of the offered candidates
    PlaceMeeple { meeple_id: MeepleId },

    /// Decline every offered candidate
    SkipMeeple,
}

/// A gray candidate offered after a tile placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeepleCandidate {
    pub kind: FeatureKind,
    pub slot: Slot,
    pub meeple: MeepleData,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A turn began with a freshly drawn tile
    TileDrawn {
        player: PlayerId,
        tile: TileTemplate,
        deck_remaining: usize,
    },

    /// A tile was placed
    TilePlaced {
        player: PlayerId,
        tile: TileId,
        position: GridPos,
        rotation: Rotation,
    },

    /// Features of the new tile that may be claimed
    MeepleCandidates {
        tile: TileId,
        candidates: Vec<MeepleCandidate>,
    },

    /// A candidate was claimed
    MeeplePlaced {
        player: PlayerId,
        tile: TileId,
        slot: Slot,
        meeple: MeepleData,
    },

    /// The player declined to claim anything
    MeepleSkipped { player: PlayerId },

    /// A feature closed during play and was scored
    FeatureCompleted {
        kind: FeatureKind,
        tiles: Vec<TileId>,
        score: u32,
        owners: Vec<PlayerId>,
    },

    /// A meeple went back to its owner's supply
    MeepleReturned { player: PlayerId, meeple: MeepleData },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// No remaining tile fits anywhere, or the tile cap was reached
    NoMorePlacements { deck_remaining: usize },

    /// An unfinished claimed feature was scored at game end
    FeatureScored {
        kind: FeatureKind,
        tiles: Vec<TileId>,
        score: u32,
        owners: Vec<PlayerId>,
    },

    /// The game is over
    GameFinished {
        scores: Vec<(PlayerId, u32)>,
        winners: Vec<PlayerId>,
    },
}
