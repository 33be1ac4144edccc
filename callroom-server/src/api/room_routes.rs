use crate::app::AppState;
use crate::error::ApiError;
use axum::Json;
use axum::extract::{Path, State};
use callroom_core::{RoomId, RoomInfo};
use serde::Serialize;
use tracing::debug;

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: RoomId,
}

/// `POST /api/video/rooms`
pub async fn create_room(State(state): State<AppState>) -> Json<ApiResponse<CreatedRoom>> {
    let room_id = state.sessions.create_room();
    ApiResponse::ok(CreatedRoom { room_id })
}

/// `GET /api/video/rooms/{room_id}`
pub async fn get_room_info(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<ApiResponse<RoomInfo>>, ApiError> {
    let room_id = RoomId::from(room_id);
    debug!("Room info requested for {}", room_id);
    let info = state.sessions.room_info(&room_id)?;
    Ok(ApiResponse::ok(info))
}

pub async fn health() -> &'static str {
    "ok"
}
