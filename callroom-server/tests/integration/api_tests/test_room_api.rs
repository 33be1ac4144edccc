use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use callroom_core::RoomId;
use callroom_server::{AppState, create_room, get_room_info, health};

use crate::integration::init_tracing;
use crate::utils::{TestClient, WsTestClient, http_request, spawn_test_server};

#[tokio::test]
async fn test_create_room_returns_fresh_id() {
    init_tracing();

    let state = AppState::default();
    let first = create_room(State(state.clone())).await;
    let second = create_room(State(state.clone())).await;

    assert!(first.success);
    assert!(!first.data.room_id.is_empty());
    assert_ne!(first.data.room_id, second.data.room_id);

    // Creating an id does not materialize a room.
    assert_eq!(state.sessions.rooms().room_count(), 0);

    let body = serde_json::to_value(&first.0).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["roomId"], first.data.room_id.as_str());
}

#[tokio::test]
async fn test_room_info_for_live_and_missing_rooms() {
    init_tracing();

    let state = AppState::default();
    let missing = get_room_info(State(state.clone()), Path("r1".to_string())).await;
    match missing {
        Ok(_) => panic!("Room should not exist yet"),
        Err(e) => assert_eq!(e.into_response().status(), StatusCode::NOT_FOUND),
    }

    let a = TestClient::connect(&state.sessions).unwrap();
    let b = TestClient::connect(&state.sessions).unwrap();
    a.join("r1").unwrap();
    b.join("r1").unwrap();

    let info = get_room_info(State(state.clone()), Path("r1".to_string()))
        .await
        .expect("Room should exist");
    assert_eq!(info.data.room_id, RoomId::from("r1"));
    assert_eq!(info.data.participant_count, 2);

    let body = serde_json::to_value(&info.0).unwrap();
    assert_eq!(body["data"]["participants"], 2);

    a.disconnect();
    b.leave("r1").unwrap();
    let gone = get_room_info(State(state), Path("r1".to_string())).await;
    assert!(gone.is_err());
}

#[tokio::test]
async fn test_blank_room_id_is_a_bad_request() {
    init_tracing();

    let state = AppState::default();
    match get_room_info(State(state), Path(" ".to_string())).await {
        Ok(_) => panic!("Blank room id should be rejected"),
        Err(e) => assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST),
    }
}

#[tokio::test]
async fn test_room_routes_over_http() {
    init_tracing();

    let (addr, _state) = spawn_test_server().await.unwrap();

    let (status, body) = http_request(addr, "POST", "/api/video/rooms").await.unwrap();
    assert_eq!(status, 200);
    let created: serde_json::Value = serde_json::from_str(&body).unwrap();
    let room_id = created["data"]["roomId"].as_str().unwrap().to_string();

    let path = format!("/api/video/rooms/{}", room_id);
    let (status, body) = http_request(addr, "GET", &path).await.unwrap();
    assert_eq!(status, 404);
    let missing: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(missing["success"], false);
    assert_eq!(missing["message"], "Room not found");

    let mut peer = WsTestClient::connect(addr).await.unwrap();
    peer.send(&callroom_core::ClientMessage::JoinRoom {
        room_id: RoomId::from(room_id.as_str()),
        caller_identity: None,
    })
    .await
    .unwrap();
    peer.next_event().await.unwrap();

    let (status, body) = http_request(addr, "GET", &path).await.unwrap();
    assert_eq!(status, 200);
    let info: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(info["data"]["roomId"], room_id.as_str());
    assert_eq!(info["data"]["participants"], 1);

    let (status, _) = http_request(addr, "POST", "/api/rooms").await.unwrap();
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_health() {
    assert_eq!(health().await, "ok");
}
