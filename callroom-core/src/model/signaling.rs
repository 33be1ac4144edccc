use crate::model::connection::{CallerIdentity, ConnectionId};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which media track a `mediaStateChange` refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// Frames sent by a client over its signaling socket.
///
/// `sdp` and `candidate` are opaque: the relay forwards them unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        caller_identity: Option<CallerIdentity>,
    },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: RoomId },
    Offer { target: ConnectionId, sdp: Value },
    Answer { target: ConnectionId, sdp: Value },
    IceCandidate {
        target: ConnectionId,
        candidate: Value,
    },
    #[serde(rename_all = "camelCase")]
    MediaStateChange {
        room_id: RoomId,
        kind: MediaKind,
        enabled: bool,
    },
}

/// The routable subset of the client vocabulary: messages that are forwarded
/// to other connections rather than changing membership.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    Offer {
        target: ConnectionId,
        sdp: Value,
    },
    Answer {
        target: ConnectionId,
        sdp: Value,
    },
    IceCandidate {
        target: ConnectionId,
        candidate: Value,
    },
    MediaStateChange {
        room_id: RoomId,
        kind: MediaKind,
        enabled: bool,
    },
}

/// Frames the server pushes to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    /// First frame on every socket: the id other peers use to address this one.
    #[serde(rename_all = "camelCase")]
    Welcome { connection_id: ConnectionId },

    /// Reply to `joinRoom`: everyone who was in the room before the join.
    #[serde(rename_all = "camelCase")]
    ExistingParticipants {
        room_id: RoomId,
        participants: Vec<ConnectionId>,
    },

    #[serde(rename_all = "camelCase")]
    UserJoined {
        room_id: RoomId,
        connection_id: ConnectionId,
        caller_identity: Option<CallerIdentity>,
    },

    #[serde(rename_all = "camelCase")]
    UserLeft {
        room_id: RoomId,
        connection_id: ConnectionId,
    },

    Offer { sdp: Value, caller: ConnectionId },

    Answer { sdp: Value, answerer: ConnectionId },

    IceCandidate { candidate: Value, from: ConnectionId },

    #[serde(rename_all = "camelCase")]
    ParticipantMediaStateChanged {
        room_id: RoomId,
        connection_id: ConnectionId,
        kind: MediaKind,
        enabled: bool,
    },

    Error { code: String, message: String },
}
