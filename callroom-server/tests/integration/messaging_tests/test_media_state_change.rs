use callroom_core::{MediaKind, RoomId, ServerEvent};

use crate::integration::{create_test_sessions, init_tracing};

#[tokio::test]
async fn test_media_state_change_broadcast() {
    init_tracing();

    let (_sessions, mut clients) = create_test_sessions(3);
    for client in &clients {
        client.join("r1").unwrap();
    }
    for client in clients.iter_mut() {
        client.drain();
    }

    let muter = clients[0].connection_id;
    clients[0].media_state("r1", MediaKind::Audio, false).unwrap();

    let expected = ServerEvent::ParticipantMediaStateChanged {
        room_id: RoomId::from("r1"),
        connection_id: muter,
        kind: MediaKind::Audio,
        enabled: false,
    };
    assert_eq!(clients[1].next_event().await.unwrap(), expected);
    assert_eq!(clients[2].next_event().await.unwrap(), expected);
    clients[0].expect_silence().await;
}

#[tokio::test]
async fn test_media_state_change_requires_membership() {
    init_tracing();

    let (_sessions, mut clients) = create_test_sessions(2);
    let mut outsider = clients.pop().unwrap();
    let mut member = clients.pop().unwrap();

    member.join("r1").unwrap();
    member.drain();

    outsider.media_state("r1", MediaKind::Video, true).unwrap();

    match outsider.next_event().await.unwrap() {
        ServerEvent::Error { code, .. } => assert_eq!(code, "not_in_room"),
        other => panic!("Expected error, got {:?}", other),
    }
    member.expect_silence().await;
}
