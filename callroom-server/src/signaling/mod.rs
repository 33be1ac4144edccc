mod session_controller;
mod signaling_router;
mod ws_handler;

pub use session_controller::*;
pub use signaling_router::*;
pub use ws_handler::*;
