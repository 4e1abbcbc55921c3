//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, RoomStatus, ServerMessage};
use crate::room::{GameRoom, RoomError};
use cloister_core::{PlayerId, SessionConfig};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All active rooms
    pub rooms: DashMap<Uuid, GameRoom>,
    /// Mapping from player ID to their room ID
    pub player_rooms: DashMap<Uuid, Uuid>,
    /// Mapping from player ID to their message sender
    pub player_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Settings every new session starts from
    pub config: SessionConfig,
}

impl ServerState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            player_rooms: DashMap::new(),
            player_senders: DashMap::new(),
            config,
        }
    }

    /// Send a message to a specific player.
    pub fn send_to_player(&self, player_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.player_senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all players in a room.
    pub fn broadcast_to_room(&self, room_id: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                self.send_to_player(*player_id, msg.clone());
            }
        }
    }

    /// Broadcast a message to all players in a room except one.
    pub fn broadcast_to_room_except(&self, room_id: Uuid, except: Uuid, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(&room_id) {
            for player_id in room.players.keys() {
                if *player_id != except {
                    self.send_to_player(*player_id, msg.clone());
                }
            }
        }
    }

    fn send_error(&self, player_id: Uuid, message: impl ToString) {
        self.send_to_player(
            player_id,
            ServerMessage::Error {
                message: message.to_string(),
            },
        );
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Cloister server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a player ID
    let player_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.player_senders.insert(player_id, tx);

    // Send welcome message
    let welcome = ServerMessage::Welcome { player_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(player_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", player_id, e);
                    state.send_error(player_id, format!("Invalid message: {e}"));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", player_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to_player(player_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", player_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up on disconnect
    handle_disconnect(player_id, &state);
    state.player_senders.remove(&player_id);
    send_task.abort();

    info!("Connection closed for {}", player_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(player_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateRoom {
            player_name,
            max_players,
        } => {
            let room_id = Uuid::new_v4();
            let room = GameRoom::new(room_id, player_id, player_name, max_players);
            let room_info = room.to_info();

            state.rooms.insert(room_id, room);
            state.player_rooms.insert(player_id, room_id);
            debug!("Player {} created room {}", player_id, room_id);

            state.send_to_player(player_id, ServerMessage::RoomCreated { room_id });
            state.send_to_player(player_id, ServerMessage::JoinedRoom { room: room_info });
        }

        ClientMessage::JoinRoom { room_id, player_name } => {
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                state.send_error(player_id, "Room not found");
                return;
            };
            match room.add_player(player_id, player_name) {
                Ok(()) => {
                    let room_info = room.to_info();
                    state.player_rooms.insert(player_id, room_id);

                    // Release the room before broadcasting
                    drop(room);
                    state.send_to_player(
                        player_id,
                        ServerMessage::JoinedRoom {
                            room: room_info.clone(),
                        },
                    );
                    state.broadcast_to_room_except(
                        room_id,
                        player_id,
                        ServerMessage::RoomUpdated { room: room_info },
                    );
                }
                Err(e) => {
                    drop(room);
                    state.send_error(player_id, e);
                }
            }
        }

        ClientMessage::LeaveRoom => {
            if let Some((_, room_id)) = state.player_rooms.remove(&player_id) {
                let should_remove = {
                    if let Some(mut room) = state.rooms.get_mut(&room_id) {
                        let is_empty = room.remove_player(player_id).unwrap_or(false);

                        if !is_empty {
                            let room_info = room.to_info();
                            drop(room);
                            state.broadcast_to_room(
                                room_id,
                                ServerMessage::RoomUpdated { room: room_info },
                            );
                        }

                        is_empty
                    } else {
                        false
                    }
                };

                if should_remove {
                    state.rooms.remove(&room_id);
                }

                state.send_to_player(player_id, ServerMessage::LeftRoom);
            }
        }

        ClientMessage::StartGame => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            let seed = Uuid::new_v4().as_u64_pair().0;
            match room.start_game(player_id, state.config.clone(), seed) {
                Ok(events) => {
                    let snapshot = (
                        room.get_game_state(),
                        room.get_valid_actions(),
                        room.get_current_player(),
                    );
                    let result = room.get_result();
                    drop(room);
                    info!("Room {} started a game", room_id);

                    if let (Some(game_state), Some(actions), Some(current_player)) = snapshot {
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::GameStarted {
                                state: game_state,
                                events,
                            },
                        );
                        state.broadcast_to_room(room_id, ServerMessage::ValidActions { actions });
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::TurnChanged {
                                player_id: current_player,
                            },
                        );
                    }
                    broadcast_result(state, room_id, result);
                }
                Err(e) => {
                    drop(room);
                    state.send_error(player_id, e);
                }
            }
        }

        ClientMessage::GameAction { action } => {
            let Some(room_id) = state.player_rooms.get(&player_id).map(|r| *r) else {
                return;
            };
            let Some(mut room) = state.rooms.get_mut(&room_id) else {
                return;
            };
            match room.apply_action(player_id, action) {
                Ok(events) => {
                    let snapshot = (
                        room.get_game_state(),
                        room.get_valid_actions(),
                        room.get_current_player(),
                    );
                    let result = room.get_result();
                    drop(room);

                    // Send action result to the acting player
                    state.send_to_player(
                        player_id,
                        ServerMessage::ActionResult {
                            success: true,
                            events,
                            error: None,
                        },
                    );

                    // Broadcast updated game state
                    if let (Some(game_state), Some(actions), Some(current_player)) = snapshot {
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::GameState { state: game_state },
                        );
                        state.broadcast_to_room(room_id, ServerMessage::ValidActions { actions });
                        state.broadcast_to_room(
                            room_id,
                            ServerMessage::TurnChanged {
                                player_id: current_player,
                            },
                        );
                    }
                    broadcast_result(state, room_id, result);
                }
                Err(RoomError::NotYourTurn) => {
                    // Out-of-turn requests are dropped without a reply
                    warn!("Ignoring out-of-turn action from {} in room {}", player_id, room_id);
                }
                Err(e) => {
                    drop(room);
                    state.send_to_player(
                        player_id,
                        ServerMessage::ActionResult {
                            success: false,
                            events: vec![],
                            error: Some(e.to_string()),
                        },
                    );
                }
            }
        }

        ClientMessage::Ping => {
            state.send_to_player(player_id, ServerMessage::Pong);
        }
    }
}

/// Announce the final standings once a room's game has ended
fn broadcast_result(
    state: &ServerState,
    room_id: Uuid,
    result: Option<(Vec<PlayerId>, Vec<String>, Vec<(PlayerId, u32)>)>,
) {
    if let Some((winners, winner_names, scores)) = result {
        info!("Room {} finished, winners {:?}", room_id, winner_names);
        state.broadcast_to_room(
            room_id,
            ServerMessage::GameOver {
                winners,
                winner_names,
                scores,
            },
        );
    }
}

/// Handle player disconnect.
fn handle_disconnect(player_id: Uuid, state: &Arc<ServerState>) {
    if let Some((_, room_id)) = state.player_rooms.remove(&player_id) {
        if let Some(mut room) = state.rooms.get_mut(&room_id) {
            // Mark player as disconnected instead of removing during game
            if room.status == RoomStatus::InGame {
                room.set_player_connected(player_id, false);
                let room_info = room.to_info();
                drop(room);
                state.broadcast_to_room(room_id, ServerMessage::RoomUpdated { room: room_info });
            } else {
                // Remove player if game hasn't started
                let is_empty = room.remove_player(player_id).unwrap_or(false);
                if is_empty {
                    drop(room);
                    state.rooms.remove(&room_id);
                } else {
                    let room_info = room.to_info();
                    drop(room);
                    state.broadcast_to_room(
                        room_id,
                        ServerMessage::RoomUpdated { room: room_info },
                    );
                }
            }
        }
    }
}
