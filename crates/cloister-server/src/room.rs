//! Game room management.

use cloister_core::{
    GameAction, GameError, GameEvent, GameSession, GameView, PlayerId, SessionConfig,
};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::protocol::{PlayerInfo, RoomInfo, RoomStatus};

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room is full")]
    RoomFull,

    #[error("Player not in room")]
    PlayerNotInRoom,

    #[error("Not the host")]
    NotHost,

    #[error("Game already started")]
    GameAlreadyStarted,

    #[error("Not enough players")]
    NotEnoughPlayers,

    #[error("Game not started")]
    GameNotStarted,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action: {0}")]
    InvalidAction(#[from] GameError),
}

/// A player in a game room.
#[derive(Debug, Clone)]
pub struct RoomPlayer {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Seat in the game (0-3), assigned when game starts
    pub seat: Option<PlayerId>,
}

impl RoomPlayer {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            connected: true,
            seat: None,
        }
    }
}

/// A game room hosting one session.
pub struct GameRoom {
    pub id: Uuid,
    pub name: String,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub players: HashMap<Uuid, RoomPlayer>,
    /// Order of players for turn taking
    pub player_order: Vec<Uuid>,
    /// The game session (once started)
    pub game: Option<GameSession>,
}

impl GameRoom {
    pub fn new(id: Uuid, host_id: Uuid, host_name: String, max_players: u8) -> Self {
        let mut players = HashMap::new();
        players.insert(host_id, RoomPlayer::new(host_id, host_name.clone()));

        Self {
            id,
            name: format!("{}'s Game", host_name),
            max_players: max_players.clamp(2, 4),
            host_id,
            status: RoomStatus::Waiting,
            players,
            player_order: vec![host_id],
            game: None,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }

    pub fn add_player(&mut self, player_id: Uuid, name: String) -> Result<(), RoomError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }

        self.players.insert(player_id, RoomPlayer::new(player_id, name));
        self.player_order.push(player_id);
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: Uuid) -> Result<bool, RoomError> {
        if !self.players.contains_key(&player_id) {
            return Err(RoomError::PlayerNotInRoom);
        }

        self.players.remove(&player_id);
        self.player_order.retain(|&id| id != player_id);

        // If host left, assign new host
        if player_id == self.host_id && !self.player_order.is_empty() {
            self.host_id = self.player_order[0];
        }

        // Return true if room is now empty
        Ok(self.players.is_empty())
    }

    pub fn set_player_connected(&mut self, player_id: Uuid, connected: bool) {
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = connected;
        }
    }

    /// Seat everyone in join order and begin the first turn
    pub fn start_game(
        &mut self,
        requester_id: Uuid,
        config: SessionConfig,
        seed: u64,
    ) -> Result<Vec<GameEvent>, RoomError> {
        if requester_id != self.host_id {
            return Err(RoomError::NotHost);
        }
        if self.status != RoomStatus::Waiting {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.players.len() < 2 {
            return Err(RoomError::NotEnoughPlayers);
        }

        for (seat, &player_id) in self.player_order.iter().enumerate() {
            if let Some(player) = self.players.get_mut(&player_id) {
                player.seat = Some(seat as PlayerId);
            }
        }

        let player_names: Vec<String> = self
            .player_order
            .iter()
            .filter_map(|id| self.players.get(id).map(|p| p.name.clone()))
            .collect();

        let mut game = GameSession::new(config, player_names, seed)?;
        let events = game.start()?;

        self.status = if game.is_finished() {
            RoomStatus::Finished
        } else {
            RoomStatus::InGame
        };
        self.game = Some(game);
        Ok(events)
    }

    pub fn apply_action(
        &mut self,
        player_id: Uuid,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;

        let player = self
            .players
            .get(&player_id)
            .ok_or(RoomError::PlayerNotInRoom)?;

        let seat = player.seat.ok_or(RoomError::PlayerNotInRoom)?;

        // Check if it's this player's turn
        if game.current_player() != seat {
            return Err(RoomError::NotYourTurn);
        }

        let events = game.apply_action(seat, action).map_err(|err| match err {
            GameError::NotYourTurn => RoomError::NotYourTurn,
            other => RoomError::InvalidAction(other),
        })?;

        if game.is_finished() {
            self.status = RoomStatus::Finished;
        }

        Ok(events)
    }

    pub fn get_game_state(&self) -> Option<GameView> {
        self.game.as_ref().map(|g| g.view())
    }

    pub fn get_valid_actions(&self) -> Option<Vec<GameAction>> {
        self.game.as_ref().map(|g| g.valid_actions(g.current_player()))
    }

    pub fn get_current_player(&self) -> Option<PlayerId> {
        self.game.as_ref().map(|g| g.current_player())
    }

    /// Winning seats with their names, and every seat's score, once finished
    pub fn get_result(&self) -> Option<(Vec<PlayerId>, Vec<String>, Vec<(PlayerId, u32)>)> {
        let game = self.game.as_ref().filter(|g| g.is_finished())?;
        let winners = game.winners();
        let names = winners
            .iter()
            .filter_map(|&seat| game.get_player(seat).map(|p| p.name.clone()))
            .collect();
        let scores = game.players().iter().map(|p| (p.id, p.score)).collect();
        Some((winners, names, scores))
    }

    pub fn to_info(&self) -> RoomInfo {
        RoomInfo {
            id: self.id,
            name: self.name.clone(),
            players: self
                .player_order
                .iter()
                .filter_map(|id| self.players.get(id).map(|p| self.player_info(p)))
                .collect(),
            max_players: self.max_players,
            host_id: self.host_id,
            status: self.status,
        }
    }

    fn player_info(&self, player: &RoomPlayer) -> PlayerInfo {
        let color = player
            .seat
            .zip(self.game.as_ref())
            .and_then(|(seat, game)| game.get_player(seat))
            .map(|p| p.color);
        PlayerInfo {
            id: player.id,
            name: player.name.clone(),
            connected: player.connected,
            color,
        }
    }
}
