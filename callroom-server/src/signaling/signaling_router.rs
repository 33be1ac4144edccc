use crate::connection::ConnectionRegistry;
use crate::error::SignalingError;
use crate::room::RoomDirectory;
use callroom_core::{ConnectionId, MediaKind, RoomId, ServerEvent, SignalMessage};
use std::sync::Arc;
use tracing::debug;

/// What happened to a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Queued for this many recipients.
    Delivered(usize),
    /// Target was unknown or already gone.
    Dropped,
}

/// Forwards signaling traffic between connections. Payloads pass through untouched.
pub struct SignalingRouter {
    registry: Arc<ConnectionRegistry>,
    rooms: Arc<RoomDirectory>,
}

impl SignalingRouter {
    pub fn new(registry: Arc<ConnectionRegistry>, rooms: Arc<RoomDirectory>) -> Self {
        Self { registry, rooms }
    }

    pub fn route(&self, sender: ConnectionId, message: SignalMessage) -> Result<RouteOutcome, SignalingError> {
        match message {
            SignalMessage::Offer { target, sdp } => {
                Ok(self.forward(target, ServerEvent::Offer { sdp, caller: sender }))
            }
            SignalMessage::Answer { target, sdp } => {
                Ok(self.forward(target, ServerEvent::Answer { sdp, answerer: sender }))
            }
            SignalMessage::IceCandidate { target, candidate } => {
                Ok(self.forward(target, ServerEvent::IceCandidate { candidate, from: sender }))
            }
            SignalMessage::MediaStateChange {
                room_id,
                kind,
                enabled,
            } => self.broadcast_media_state(sender, room_id, kind, enabled),
        }
    }

    /// Sends one event to one connection.
    pub fn send_to(&self, target: &ConnectionId, event: ServerEvent) -> bool {
        self.registry.deliver(target, event)
    }

    /// Sends the same event to every listed connection; returns how many accepted it.
    pub fn notify_all(&self, recipients: &[ConnectionId], event: &ServerEvent) -> usize {
        recipients
            .iter()
            .filter(|target| self.registry.deliver(target, event.clone()))
            .count()
    }

    fn forward(&self, target: ConnectionId, event: ServerEvent) -> RouteOutcome {
        if self.registry.deliver(&target, event) {
            RouteOutcome::Delivered(1)
        } else {
            debug!("Target {} is gone, dropping signal", target);
            RouteOutcome::Dropped
        }
    }

    fn broadcast_media_state(
        &self,
        sender: ConnectionId,
        room_id: RoomId,
        kind: MediaKind,
        enabled: bool,
    ) -> Result<RouteOutcome, SignalingError> {
        let event = ServerEvent::ParticipantMediaStateChanged {
            room_id: room_id.clone(),
            connection_id: sender,
            kind,
            enabled,
        };

        let delivered = self
            .rooms
            .with_members(&room_id, |members| {
                if !members.contains(&sender) {
                    return None;
                }
                let others: Vec<ConnectionId> =
                    members.iter().copied().filter(|m| *m != sender).collect();
                Some(self.notify_all(&others, &event))
            })
            .flatten();

        match delivered {
            Some(count) => Ok(RouteOutcome::Delivered(count)),
            None => Err(SignalingError::NotInRoom(room_id)),
        }
    }
}
