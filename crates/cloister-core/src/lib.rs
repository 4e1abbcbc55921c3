//! Cloister - a Carcassonne-style tile laying game engine
//!
//! This crate provides the core game logic for Cloister, including:
//! - Square grid coordinates and rotated tiles with feature slots
//! - Edge compatibility and board placement validation
//! - Connected feature traversal, completion detection and scoring
//! - The meeple ledger and the turn state machine
//!
//! # Architecture
//!
//! The engine is synchronous and platform-agnostic. A `GameSession` owns the
//! board, ledger, deck and players; every mutating call returns the events
//! it produced.
//!
//! # Modules
//!
//! - [`grid`]: Cell coordinates and directions
//! - [`feature`]: Feature flags, slots and claimable kinds
//! - [`tile`]: Tile templates, rotation and placed tiles
//! - [`compat`]: Edge compatibility rules
//! - [`board`]: Tile placement and open positions
//! - [`graph`]: Connected feature traversal
//! - [`completion`]: Closed feature detection
//! - [`scoring`]: Point values
//! - [`meeple`]: Meeple tokens and claim rules
//! - [`game`]: Turn state machine

pub mod actions;
pub mod board;
pub mod compat;
pub mod completion;
pub mod config;
pub mod deck;
pub mod feature;
pub mod game;
pub mod graph;
pub mod grid;
pub mod meeple;
pub mod player;
pub mod scoring;
pub mod tile;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, MeepleCandidate};
pub use board::{Board, PlacementError};
pub use config::{ConfigError, DeckConfig, SessionConfig};
pub use deck::{Deck, TileCount};
pub use feature::{FeatureFlags, FeatureKind, MeepleKind, Slot};
pub use game::{GameError, GameSession, GameView, TurnPhase};
pub use graph::{connected_component, TileFeatureKey};
pub use grid::{Direction, GridPos};
pub use meeple::{MeepleData, MeepleId, MeepleLedger, PlacedMeeple, PlayerColor};
pub use player::{Player, PlayerId};
pub use tile::{PlacedTile, Rotation, TileId, TileTemplate};
