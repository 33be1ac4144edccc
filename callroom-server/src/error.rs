use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use callroom_core::{ConnectionId, RoomId, ServerEvent};
use serde_json::json;
use thiserror::Error;

/// Failures a client can be told about. Routing misses are not in here:
/// a vanished target is an expected race and is dropped silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalingError {
    /// Frame could not be decoded (bad JSON, unknown type, missing field).
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Room id must not be empty")]
    EmptyRoomId,

    #[error("Not a member of room {0}")]
    NotInRoom(RoomId),

    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),

    /// The connection was unregistered while the request was in flight.
    #[error("Connection is gone: {0}")]
    ConnectionGone(ConnectionId),
}

impl SignalingError {
    /// Stable code carried in the `error` frame.
    pub fn code(&self) -> &'static str {
        match self {
            SignalingError::InvalidMessage(_) => "invalid_message",
            SignalingError::EmptyRoomId => "invalid_room_id",
            SignalingError::NotInRoom(_) => "not_in_room",
            SignalingError::RoomNotFound(_) => "room_not_found",
            SignalingError::ConnectionGone(_) => "connection_gone",
        }
    }

    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::Error {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<serde_json::Error> for SignalingError {
    fn from(e: serde_json::Error) -> Self {
        SignalingError::InvalidMessage(e.to_string())
    }
}

/// Errors of the HTTP room API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Room not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),
}

impl From<SignalingError> for ApiError {
    fn from(e: SignalingError) -> Self {
        match e {
            SignalingError::RoomNotFound(_) => ApiError::NotFound,
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
