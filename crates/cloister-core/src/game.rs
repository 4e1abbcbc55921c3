//! Core game state machine.
//!
//! This module contains `GameSession`, which owns the board, the meeple
//! ledger, the deck and the players, and serializes every mutation through
//! `apply_action`.

use crate::actions::{GameAction, GameEvent, MeepleCandidate};
use crate::board::{Board, PlacementError};
use crate::completion::{
    is_component_complete, is_monastery_complete, monastery_key, monastery_occupancy,
};
use crate::config::SessionConfig;
use crate::deck::Deck;
use crate::feature::FeatureKind;
use crate::graph::{component_tiles, connected_component, TileFeatureKey};
use crate::grid::GridPos;
use crate::meeple::{MeepleId, MeepleLedger, PlacedMeeple, PlayerColor};
use crate::player::{Player, PlayerId};
use crate::scoring::{score, ScoreBasis};
use crate::tile::{PlacedTile, TileId, TileTemplate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Smallest table
const MIN_PLAYERS: usize = 2;

/// Largest table
const MAX_PLAYERS: usize = 4;

/// Turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Between turns, or before `start`
    Idle,
    /// The current player holds a drawn tile
    PlacingTile,
    /// Candidates are on the new tile, waiting for a choice
    PlacingMeeple,
    /// Scoring the placement before handing over
    TurnCompleted,
    /// Game is over
    Finished,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid placement: {0}")]
    Placement(#[from] PlacementError),

    #[error("No candidate meeple {0}")]
    UnknownMeeple(MeepleId),

    #[error("No meeples left")]
    NoMeeplesLeft,

    #[error("A game needs 2-4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Invalid slot index {0}")]
    InvalidSlot(u8),

    #[error("Invalid rotation {0}")]
    InvalidRotation(u8),

    #[error("Flags {0:#04x} name no claimable feature")]
    InvalidFeatureKind(u8),

    #[error("Game is over")]
    GameOver,
}

/// Snapshot of a session for clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub phase: TurnPhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub current_tile: Option<TileTemplate>,
    pub deck_remaining: usize,
    pub tiles: Vec<PlacedTile>,
    pub meeples: Vec<PlacedMeeple>,
    pub players: Vec<Player>,
    pub open_positions: Vec<GridPos>,
}

/// One game in progress
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    ledger: MeepleLedger,
    deck: Deck,
    players: Vec<Player>,
    current_player: PlayerId,
    phase: TurnPhase,
    /// Tile drawn for the current turn, until it is placed
    current_tile: Option<TileTemplate>,
    /// Tile placed this turn, while its candidates and scoring are pending
    placed_tile: Option<TileId>,
    /// Turn number (starts at 1)
    turn_number: u32,
    max_tiles: Option<u32>,
}

impl GameSession {
    /// Create a session with a deck shuffled from `seed`
    pub fn new(
        config: SessionConfig,
        player_names: Vec<String>,
        seed: u64,
    ) -> Result<Self, GameError> {
        let mut deck = Deck::from_config(&config.deck);
        deck.shuffle(&mut StdRng::seed_from_u64(seed));
        Self::with_deck(config, player_names, deck)
    }

    /// Create a session drawing from `deck` in the given order
    pub fn with_deck(
        config: SessionConfig,
        player_names: Vec<String>,
        deck: Deck,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_names.len()) {
            return Err(GameError::InvalidPlayerCount(player_names.len()));
        }

        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name, config.meeples_per_player))
            .collect();

        let mut board = Board::new();
        board.place_starter(config.deck.starter)?;

        info!(players = ?players_summary(&players), deck = deck.len(), "Created game session");

        Ok(Self {
            board,
            ledger: MeepleLedger::new(),
            deck,
            players,
            current_player: 0,
            phase: TurnPhase::Idle,
            current_tile: None,
            placed_tile: None,
            turn_number: 0,
            max_tiles: config.max_tiles,
        })
    }

    // ==================== Query Methods ====================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn ledger(&self) -> &MeepleLedger {
        &self.ledger
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current_tile(&self) -> Option<&TileTemplate> {
        self.current_tile.as_ref()
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.len()
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        self.phase == TurnPhase::Finished
    }

    /// Players with the highest score
    pub fn winners(&self) -> Vec<PlayerId> {
        let Some(top) = self.players.iter().map(|p| p.score).max() else {
            return Vec::new();
        };
        self.players
            .iter()
            .filter(|p| p.score == top)
            .map(|p| p.id)
            .collect()
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        if player != self.current_player {
            return Vec::new();
        }

        match self.phase {
            TurnPhase::PlacingTile => self
                .current_tile
                .as_ref()
                .map(|template| {
                    self.board
                        .legal_placements(template)
                        .into_iter()
                        .map(|(position, rotation)| GameAction::PlaceTile { position, rotation })
                        .collect()
                })
                .unwrap_or_default(),
            TurnPhase::PlacingMeeple => {
                let mut actions: Vec<GameAction> = self
                    .ledger
                    .candidates()
                    .into_iter()
                    .map(|placed| GameAction::PlaceMeeple {
                        meeple_id: placed.meeple.id,
                    })
                    .collect();
                actions.push(GameAction::SkipMeeple);
                actions
            }
            TurnPhase::Idle | TurnPhase::TurnCompleted | TurnPhase::Finished => Vec::new(),
        }
    }

    /// JSON-friendly snapshot of the whole session
    pub fn view(&self) -> GameView {
        let mut open_positions: Vec<GridPos> = self.board.open_positions().into_iter().collect();
        open_positions.sort();

        GameView {
            phase: self.phase,
            current_player: self.current_player,
            turn_number: self.turn_number,
            current_tile: self.current_tile.clone(),
            deck_remaining: self.deck.len(),
            tiles: self.board.tiles().to_vec(),
            meeples: self.ledger.entries(),
            players: self.players.clone(),
            open_positions,
        }
    }

    // ==================== Turn Flow ====================

    /// Begin the first turn
    pub fn start(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.phase {
            TurnPhase::Idle if self.turn_number == 0 => Ok(self.begin_turn()),
            TurnPhase::Finished => Err(GameError::GameOver),
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Apply an action to the game state
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        if self.phase == TurnPhase::Finished {
            return Err(GameError::GameOver);
        }
        if player != self.current_player {
            warn!(player, current = self.current_player, ?action, "Rejected out-of-turn request");
            return Err(GameError::NotYourTurn);
        }

        match action {
            GameAction::PlaceTile { position, rotation } => {
                if self.phase != TurnPhase::PlacingTile {
                    return Err(GameError::InvalidPhase);
                }

                let id = self
                    .board
                    .place(position, self.current_tile.clone(), rotation)
                    .map_err(|err| {
                        debug!(player, %position, error = %err, "Rejected tile placement");
                        GameError::Placement(err)
                    })?;
                self.current_tile = None;
                self.placed_tile = Some(id);

                let mut events = vec![GameEvent::TilePlaced {
                    player,
                    tile: id,
                    position,
                    rotation,
                }];

                let candidates = self.offer_candidates(id);
                if candidates.is_empty() {
                    events.extend(self.complete_turn());
                } else {
                    self.phase = TurnPhase::PlacingMeeple;
                    events.push(GameEvent::MeepleCandidates { tile: id, candidates });
                }
                Ok(events)
            }

            GameAction::PlaceMeeple { meeple_id } => {
                if self.phase != TurnPhase::PlacingMeeple {
                    return Err(GameError::InvalidPhase);
                }
                let placed = self
                    .ledger
                    .find(meeple_id)
                    .filter(|placed| placed.meeple.is_candidate())
                    .ok_or(GameError::UnknownMeeple(meeple_id))?;

                let seat = self.seat_mut(player)?;
                if !seat.take_meeple() {
                    return Err(GameError::NoMeeplesLeft);
                }
                let color = seat.color;

                let meeple = self
                    .ledger
                    .promote(meeple_id, color)
                    .ok_or(GameError::UnknownMeeple(meeple_id))?;
                self.ledger.discard_candidates();
                debug!(
                    player,
                    meeple = %meeple.id,
                    tile = %placed.key.tile,
                    slot = ?placed.key.slot,
                    "Meeple placed"
                );

                let mut events = vec![GameEvent::MeeplePlaced {
                    player,
                    tile: placed.key.tile,
                    slot: placed.key.slot,
                    meeple,
                }];
                events.extend(self.complete_turn());
                Ok(events)
            }

            GameAction::SkipMeeple => {
                if self.phase != TurnPhase::PlacingMeeple {
                    return Err(GameError::InvalidPhase);
                }
                self.ledger.discard_candidates();

                let mut events = vec![GameEvent::MeepleSkipped { player }];
                events.extend(self.complete_turn());
                Ok(events)
            }
        }
    }

    /// Draw for the current player, or end the game if nothing fits
    fn begin_turn(&mut self) -> Vec<GameEvent> {
        let capped = self
            .max_tiles
            .is_some_and(|max| self.board.tile_count() >= max as usize);

        let board = &self.board;
        let drawn = if capped {
            None
        } else {
            self.deck.draw_playable(|template| board.has_legal_placement(template))
        };

        let Some(template) = drawn else {
            info!(
                deck_remaining = self.deck.len(),
                tiles = self.board.tile_count(),
                "No more placements"
            );
            let mut events = vec![GameEvent::NoMorePlacements {
                deck_remaining: self.deck.len(),
            }];
            events.extend(self.finish());
            return events;
        };

        self.turn_number += 1;
        self.phase = TurnPhase::PlacingTile;
        self.current_tile = Some(template.clone());
        debug!(
            player = self.current_player,
            turn = self.turn_number,
            tile = %template.name,
            "Tile drawn"
        );

        vec![GameEvent::TileDrawn {
            player: self.current_player,
            tile: template,
            deck_remaining: self.deck.len(),
        }]
    }

    /// Put a gray candidate on every claimable, unoccupied feature of a new tile
    fn offer_candidates(&mut self, id: TileId) -> Vec<MeepleCandidate> {
        let has_meeple = self
            .get_player(self.current_player)
            .is_some_and(|p| p.has_meeple());
        let Some(tile) = self.board.tile(id) else {
            return Vec::new();
        };
        if !has_meeple {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for (slot, flags) in tile.features() {
            let Some(kind) = FeatureKind::for_slot(flags, slot) else {
                continue;
            };
            if !self.ledger.can_place(&self.board, id, flags, slot) {
                continue;
            }
            if let Some(meeple) = self.ledger.place_candidate(id, flags, slot) {
                candidates.push(MeepleCandidate { kind, slot, meeple });
            }
        }
        candidates
    }

    /// Score what the new tile closed, hand over and start the next turn
    fn complete_turn(&mut self) -> Vec<GameEvent> {
        self.phase = TurnPhase::TurnCompleted;
        let mut events = Vec::new();

        if let Some(id) = self.placed_tile.take() {
            events.extend(self.score_completed(id));
        }

        let player = self.current_player;
        let next_player = ((player as usize + 1) % self.players.len()) as PlayerId;
        events.push(GameEvent::TurnEnded { player, next_player });

        self.current_player = next_player;
        self.phase = TurnPhase::Idle;
        events.extend(self.begin_turn());
        events
    }

    // ==================== Scoring ====================

    /// Score every feature the tile just closed
    fn score_completed(&mut self, id: TileId) -> Vec<GameEvent> {
        let Some(tile) = self.board.tile(id) else {
            return Vec::new();
        };
        let position = tile.position;
        let features = tile.features();

        let mut events = Vec::new();
        let mut seen: HashSet<(FeatureKind, TileFeatureKey)> = HashSet::new();

        for (slot, flags) in features {
            let Some(kind) = FeatureKind::for_slot(flags, slot) else {
                continue;
            };
            if kind == FeatureKind::Monastery {
                continue;
            }
            let start = TileFeatureKey::new(id, flags, slot);
            if seen.contains(&(kind, start)) {
                continue;
            }

            let component = connected_component(&self.board, start, kind.flag());
            seen.extend(component.iter().map(|key| (kind, *key)));
            if is_component_complete(&self.board, &component) {
                let basis = ScoreBasis::of_component(&self.board, &component);
                events.extend(self.award(kind, &component, basis, false));
            }
        }

        let block = std::iter::once(position).chain(position.surrounding());
        for cell in block {
            let Some(key) = monastery_key(&self.board, &cell) else {
                continue;
            };
            if is_monastery_complete(&self.board, cell) {
                let basis = ScoreBasis::new(monastery_occupancy(&self.board, cell), 0);
                let component = HashSet::from([key]);
                events.extend(self.award(FeatureKind::Monastery, &component, basis, false));
            }
        }

        events
    }

    /// Pay a feature's score to its owners.
    ///
    /// During play the feature's meeples go back to their owners; at game end
    /// they stay where they are.
    fn award(
        &mut self,
        kind: FeatureKind,
        component: &HashSet<TileFeatureKey>,
        basis: ScoreBasis,
        end_game: bool,
    ) -> Vec<GameEvent> {
        let points = score(kind, basis, end_game);
        let owners = self.seats_of(&self.ledger.owners_in(component, kind));
        for &owner in &owners {
            if let Some(player) = self.players.get_mut(owner as usize) {
                player.add_score(points);
            }
        }

        let tiles = component_tiles(component);
        info!(%kind, tiles = tiles.len(), points, ?owners, end_game, "Feature scored");

        let mut events = vec![if end_game {
            GameEvent::FeatureScored {
                kind,
                tiles,
                score: points,
                owners,
            }
        } else {
            GameEvent::FeatureCompleted {
                kind,
                tiles,
                score: points,
                owners,
            }
        }];

        if !end_game {
            for placed in self.ledger.meeples_in(component, kind) {
                let Some(meeple) = self.ledger.remove(placed.meeple.id) else {
                    continue;
                };
                let Some(player) = self.players.iter_mut().find(|p| p.color == meeple.color) else {
                    continue;
                };
                player.return_meeple();
                events.push(GameEvent::MeepleReturned {
                    player: player.id,
                    meeple,
                });
            }
        }

        events
    }

    /// Score every still-claimed feature and end the game
    fn finish(&mut self) -> Vec<GameEvent> {
        self.phase = TurnPhase::Finished;
        self.current_tile = None;
        self.ledger.discard_candidates();

        let mut events = Vec::new();
        // A center slot can sit in a road, a city and a monastery at once
        let mut seen: HashSet<(FeatureKind, TileFeatureKey)> = HashSet::new();

        for placed in self.ledger.claimed() {
            let kind = FeatureKind::from(placed.meeple.kind);
            if seen.contains(&(kind, placed.key)) {
                continue;
            }
            let (component, basis) = match kind {
                FeatureKind::Monastery => {
                    let occupancy = self
                        .board
                        .tile(placed.key.tile)
                        .map(|tile| monastery_occupancy(&self.board, tile.position))
                        .unwrap_or(0);
                    (HashSet::from([placed.key]), ScoreBasis::new(occupancy, 0))
                }
                FeatureKind::Road | FeatureKind::City => {
                    let component = connected_component(&self.board, placed.key, kind.flag());
                    let basis = ScoreBasis::of_component(&self.board, &component);
                    (component, basis)
                }
            };
            seen.extend(component.iter().map(|key| (kind, *key)));
            events.extend(self.award(kind, &component, basis, true));
        }

        let scores = self.players.iter().map(|p| (p.id, p.score)).collect();
        let winners = self.winners();
        info!(?winners, "Game finished");
        events.push(GameEvent::GameFinished { scores, winners });
        events
    }

    // ==================== Helpers ====================

    fn seat_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players.get_mut(id as usize).ok_or(GameError::NotYourTurn)
    }

    fn seats_of(&self, colors: &BTreeSet<PlayerColor>) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| colors.contains(&p.color))
            .map(|p| p.id)
            .collect()
    }
}

fn players_summary(players: &[Player]) -> Vec<&str> {
    players.iter().map(|p| p.name.as_str()).collect()
}
