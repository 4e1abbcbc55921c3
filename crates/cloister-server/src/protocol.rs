//! WebSocket protocol messages for Cloister multiplayer.

use cloister_core::{GameAction, GameEvent, GameView, PlayerColor, PlayerId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Create a new game room
    CreateRoom { player_name: String, max_players: u8 },

    /// Join an existing room
    JoinRoom { room_id: Uuid, player_name: String },

    /// Leave current room
    LeaveRoom,

    /// Start the game (host only)
    StartGame,

    /// Submit a game action
    GameAction { action: GameAction },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned player ID
    Welcome { player_id: Uuid },

    /// Room created successfully
    RoomCreated { room_id: Uuid },

    /// Joined room successfully
    JoinedRoom { room: RoomInfo },

    /// Left room successfully
    LeftRoom,

    /// Room state updated (player joined/left)
    RoomUpdated { room: RoomInfo },

    /// Game started
    GameStarted { state: GameView, events: Vec<GameEvent> },

    /// Game state updated
    GameState { state: GameView },

    /// Result of the sender's own action
    ActionResult {
        success: bool,
        events: Vec<GameEvent>,
        error: Option<String>,
    },

    /// Valid actions for current player
    ValidActions { actions: Vec<GameAction> },

    /// Current player changed
    TurnChanged { player_id: PlayerId },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,

    /// Game finished
    GameOver {
        winners: Vec<PlayerId>,
        winner_names: Vec<String>,
        scores: Vec<(PlayerId, u32)>,
    },
}

/// Room information for clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: Uuid,
    pub name: String,
    pub players: Vec<PlayerInfo>,
    pub max_players: u8,
    pub host_id: Uuid,
    pub status: RoomStatus,
}

/// Player information in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: Uuid,
    pub name: String,
    pub connected: bool,
    /// Meeple color, assigned when the game starts
    pub color: Option<PlayerColor>,
}

/// Room status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomStatus {
    Waiting,
    InGame,
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloister_core::{GridPos, Rotation};

    #[test]
    fn test_client_message_tagging() {
        let json = r#"{"type":"GameAction","payload":{"action":{"PlaceTile":
            {"position":{"x":1,"y":0},"rotation":3}}}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::GameAction { action } => assert_eq!(
                action,
                GameAction::PlaceTile {
                    position: GridPos::new(1, 0),
                    rotation: Rotation::new(3).unwrap(),
                }
            ),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_rotation_rejected() {
        let json = r#"{"type":"GameAction","payload":{"action":{"PlaceTile":
            {"position":{"x":1,"y":0},"rotation":4}}}}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_unit_messages() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"Ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
        assert_eq!(serde_json::to_string(&ServerMessage::Pong).unwrap(), r#"{"type":"Pong"}"#);
    }
}
