
use tracing::Level;

use callroom_server::SessionController;

use crate::utils::TestClient;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Fresh relay state plus `count` connected in-process clients.
pub fn create_test_sessions(count: usize) -> (SessionController, Vec<TestClient>) {
    let sessions = SessionController::new();
    let clients = (0..count)
        .map(|_| TestClient::connect(&sessions).expect("Failed to connect test client"))
        .collect();
    (sessions, clients)
}
