use callroom_core::{CallerIdentity, ConnectionId, RoomId, ServerEvent};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Events buffered per connection before new ones are dropped.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

struct ConnectionEntry {
    outbound: mpsc::Sender<ServerEvent>,
    identity: Option<CallerIdentity>,
    /// Reverse index of room membership, kept in step with the room directory.
    rooms: HashSet<RoomId>,
}

/// Live connections and what is known about each of them.
///
/// When both maps are locked, the room directory entry is always taken first.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted transport and returns its id.
    pub fn register(&self, outbound: mpsc::Sender<ServerEvent>) -> ConnectionId {
        loop {
            let id = ConnectionId::new();
            if let Entry::Vacant(vacant) = self.connections.entry(id) {
                vacant.insert(ConnectionEntry {
                    outbound,
                    identity: None,
                    rooms: HashSet::new(),
                });
                debug!("Registered connection {}", id);
                return id;
            }
        }
    }

    /// Drops the connection and hands back the rooms it was in.
    /// Returns `None` if it was already unregistered.
    pub fn unregister(&self, id: &ConnectionId) -> Option<HashSet<RoomId>> {
        let (_, entry) = self.connections.remove(id)?;
        debug!("Unregistered connection {}", id);
        Some(entry.rooms)
    }

    pub fn is_live(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn identity_of(&self, id: &ConnectionId) -> Option<CallerIdentity> {
        self.connections.get(id)?.identity.clone()
    }

    pub(crate) fn set_identity(&self, id: &ConnectionId, identity: CallerIdentity) -> bool {
        match self.connections.get_mut(id) {
            Some(mut entry) => {
                entry.identity = Some(identity);
                true
            }
            None => false,
        }
    }

    pub fn rooms_of(&self, id: &ConnectionId) -> HashSet<RoomId> {
        self.connections
            .get(id)
            .map(|entry| entry.rooms.clone())
            .unwrap_or_default()
    }

    /// Records membership on the connection side. Fails if the connection is gone,
    /// in which case the caller must not add it to the room either.
    pub(crate) fn attach_room(&self, id: &ConnectionId, room_id: &RoomId) -> bool {
        match self.connections.get_mut(id) {
            Some(mut entry) => {
                entry.rooms.insert(room_id.clone());
                true
            }
            None => false,
        }
    }

    pub(crate) fn detach_room(&self, id: &ConnectionId, room_id: &RoomId) {
        if let Some(mut entry) = self.connections.get_mut(id) {
            entry.rooms.remove(room_id);
        }
    }

    /// Queues an event on the connection's outbound channel without blocking.
    /// Returns `false` if the connection is unknown, its writer has stopped, or
    /// its queue is full. A full queue drops the event and keeps the connection.
    pub fn deliver(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        let Some(entry) = self.connections.get(id) else {
            debug!("Dropping event for unknown connection {}", id);
            return false;
        };
        match entry.outbound.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Outbound queue of {} is full, dropping event", id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("Outbound channel of {} is closed", id);
                false
            }
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
