use crate::connection::ConnectionRegistry;
use crate::error::SignalingError;
use crate::room::{JoinOutcome, RoomDirectory};
use crate::signaling::{RouteOutcome, SignalingRouter};
use callroom_core::{
    CallerIdentity, ClientMessage, ConnectionId, RoomId, RoomInfo, ServerEvent, SignalMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns the shared relay state and drives join, leave and disconnect.
///
/// Cheap to clone; every clone works on the same registry and directory.
#[derive(Clone)]
pub struct SessionController {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
    router: Arc<SignalingRouter>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomDirectory::new(registry.clone()));
        let router = Arc::new(SignalingRouter::new(registry.clone(), rooms.clone()));
        Self {
            registry,
            rooms,
            router,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }

    pub fn router(&self) -> &SignalingRouter {
        &self.router
    }

    /// Registers a new transport and greets it with its connection id.
    pub fn connect(&self, outbound: mpsc::Sender<ServerEvent>) -> ConnectionId {
        let connection_id = self.registry.register(outbound);
        self.router
            .send_to(&connection_id, ServerEvent::Welcome { connection_id });
        connection_id
    }

    /// Decodes one text frame and dispatches it. Failures are reported back to the
    /// sender as an `error` event; the connection stays open.
    pub fn handle_frame(&self, sender: ConnectionId, text: &str) {
        let result = serde_json::from_str::<ClientMessage>(text)
            .map_err(SignalingError::from)
            .and_then(|message| self.handle(sender, message));

        if let Err(e) = result {
            warn!("Rejected message from {}: {}", sender, e);
            self.router.send_to(&sender, e.to_event());
        }
    }

    pub fn handle(&self, sender: ConnectionId, message: ClientMessage) -> Result<(), SignalingError> {
        match message {
            ClientMessage::JoinRoom {
                room_id,
                caller_identity,
            } => self.join_room(sender, room_id, caller_identity).map(|_| ()),
            ClientMessage::LeaveRoom { room_id } => self.leave_room(sender, &room_id).map(|_| ()),
            ClientMessage::Offer { target, sdp } => {
                self.route(sender, SignalMessage::Offer { target, sdp })
            }
            ClientMessage::Answer { target, sdp } => {
                self.route(sender, SignalMessage::Answer { target, sdp })
            }
            ClientMessage::IceCandidate { target, candidate } => {
                self.route(sender, SignalMessage::IceCandidate { target, candidate })
            }
            ClientMessage::MediaStateChange {
                room_id,
                kind,
                enabled,
            } => {
                if room_id.is_empty() {
                    return Err(SignalingError::EmptyRoomId);
                }
                self.route(
                    sender,
                    SignalMessage::MediaStateChange {
                        room_id,
                        kind,
                        enabled,
                    },
                )
            }
        }
    }

    fn route(&self, sender: ConnectionId, message: SignalMessage) -> Result<(), SignalingError> {
        if let RouteOutcome::Dropped = self.router.route(sender, message)? {
            debug!("Signal from {} was not delivered", sender);
        }
        Ok(())
    }

    /// absent -> joined. The joiner gets `existingParticipants`, prior members get
    /// `userJoined`, both while the room is still locked.
    pub fn join_room(
        &self,
        conn: ConnectionId,
        room_id: RoomId,
        caller_identity: Option<CallerIdentity>,
    ) -> Result<JoinOutcome, SignalingError> {
        if room_id.is_empty() {
            return Err(SignalingError::EmptyRoomId);
        }
        if let Some(identity) = caller_identity {
            self.registry.set_identity(&conn, identity);
        }
        let caller_identity = self.registry.identity_of(&conn);

        let outcome = self.rooms.join(&room_id, conn, |existing| {
            self.router.send_to(
                &conn,
                ServerEvent::ExistingParticipants {
                    room_id: room_id.clone(),
                    participants: existing.to_vec(),
                },
            );
            self.router.notify_all(
                existing,
                &ServerEvent::UserJoined {
                    room_id: room_id.clone(),
                    connection_id: conn,
                    caller_identity: caller_identity.clone(),
                },
            );
        });

        match &outcome {
            JoinOutcome::Joined { existing } => {
                info!("{} joined room {} with {} others", conn, room_id, existing.len());
            }
            JoinOutcome::AlreadyMember { existing } => {
                debug!("{} is already in room {}", conn, room_id);
                self.router.send_to(
                    &conn,
                    ServerEvent::ExistingParticipants {
                        room_id: room_id.clone(),
                        participants: existing.clone(),
                    },
                );
            }
            JoinOutcome::Gone => return Err(SignalingError::ConnectionGone(conn)),
        }
        Ok(outcome)
    }

    /// joined -> left. Returns whether the connection was a member. Remaining
    /// members hear `userLeft` exactly once, however many times this is called.
    pub fn leave_room(&self, conn: ConnectionId, room_id: &RoomId) -> Result<bool, SignalingError> {
        if room_id.is_empty() {
            return Err(SignalingError::EmptyRoomId);
        }
        Ok(self.release(&conn, room_id))
    }

    /// joined -> disconnected for every room of the connection. Safe to call more than once.
    pub fn disconnect(&self, conn: &ConnectionId) {
        let Some(rooms) = self.registry.unregister(conn) else {
            debug!("{} already cleaned up", conn);
            return;
        };

        for room_id in &rooms {
            self.release(conn, room_id);
        }
        info!("{} disconnected, left {} room(s)", conn, rooms.len());
    }

    fn release(&self, conn: &ConnectionId, room_id: &RoomId) -> bool {
        let removed = self.rooms.leave(room_id, conn, |remaining| {
            self.router.notify_all(
                remaining,
                &ServerEvent::UserLeft {
                    room_id: room_id.clone(),
                    connection_id: *conn,
                },
            );
        });

        match removed {
            Some(_) => {
                info!("{} left room {}", conn, room_id);
                true
            }
            None => {
                debug!("{} was not in room {}", conn, room_id);
                false
            }
        }
    }

    /// Generates a room name. The room itself only exists once someone joins it.
    pub fn create_room(&self) -> RoomId {
        let room_id = RoomId::generate();
        info!("Allocated room id {}", room_id);
        room_id
    }

    pub fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, SignalingError> {
        if room_id.is_empty() {
            return Err(SignalingError::EmptyRoomId);
        }
        let participant_count = self
            .rooms
            .participant_count(room_id)
            .ok_or_else(|| SignalingError::RoomNotFound(room_id.clone()))?;

        Ok(RoomInfo {
            room_id: room_id.clone(),
            participant_count,
        })
    }
}
