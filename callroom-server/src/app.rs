use crate::api::{create_room, get_room_info, health};
use crate::signaling::{SessionController, ws_handler};
use axum::Router;
use axum::routing::{get, post};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: SessionController,
}

impl AppState {
    pub fn new(sessions: SessionController) -> Self {
        Self { sessions }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let video_routes = Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{room_id}", get(get_room_info));

    Router::new()
        .route("/ws", get(ws_handler))
        .nest("/api/video", video_routes)
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Serves the relay on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Signaling server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
