mod connection;
mod room;
mod signaling;

pub use connection::{CallerIdentity, ConnectionId};
pub use room::{RoomId, RoomInfo};
pub use signaling::{ClientMessage, MediaKind, ServerEvent, SignalMessage};
