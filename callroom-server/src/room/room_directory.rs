use crate::connection::ConnectionRegistry;
use callroom_core::{ConnectionId, RoomId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a join attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Newly added; `existing` are the members that were there before.
    Joined { existing: Vec<ConnectionId> },
    /// The connection was already a member; nothing changed.
    AlreadyMember { existing: Vec<ConnectionId> },
    /// The connection disconnected before the join could be applied.
    Gone,
}

/// Room id to member set.
///
/// Every mutation runs under the map's write guard for that room, and the
/// `notify` callback passed to [`join`](Self::join) and [`leave`](Self::leave)
/// runs inside the same guard, so membership change and fan-out are one step.
/// Callbacks must not touch the directory again.
pub struct RoomDirectory {
    rooms: DashMap<RoomId, HashSet<ConnectionId>>,
    registry: Arc<ConnectionRegistry>,
}

impl RoomDirectory {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            rooms: DashMap::new(),
            registry,
        }
    }

    /// Adds `conn` to `room_id`, creating the room if needed. `notify` receives the
    /// members present before the join and is only called when the connection was
    /// actually added.
    pub fn join<F>(&self, room_id: &RoomId, conn: ConnectionId, notify: F) -> JoinOutcome
    where
        F: FnOnce(&[ConnectionId]),
    {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut occupied) => {
                let members = occupied.get_mut();
                let existing: Vec<ConnectionId> =
                    members.iter().copied().filter(|m| *m != conn).collect();

                if members.contains(&conn) {
                    return JoinOutcome::AlreadyMember { existing };
                }
                if !self.registry.attach_room(&conn, room_id) {
                    return JoinOutcome::Gone;
                }

                members.insert(conn);
                debug!("{} joined room {} ({} members)", conn, room_id, members.len());
                notify(&existing);
                JoinOutcome::Joined { existing }
            }
            Entry::Vacant(vacant) => {
                if !self.registry.attach_room(&conn, room_id) {
                    return JoinOutcome::Gone;
                }

                info!("Creating new room: {}", room_id);
                let _members = vacant.insert(HashSet::from([conn]));
                notify(&[]);
                JoinOutcome::Joined {
                    existing: Vec::new(),
                }
            }
        }
    }

    /// Removes `conn` from `room_id`. Returns the remaining members, or `None` if the
    /// connection was not a member (so a repeated leave is a no-op). The room is
    /// deleted as soon as it is empty. `notify` only runs when something was removed.
    pub fn leave<F>(&self, room_id: &RoomId, conn: &ConnectionId, notify: F) -> Option<Vec<ConnectionId>>
    where
        F: FnOnce(&[ConnectionId]),
    {
        let Entry::Occupied(mut occupied) = self.rooms.entry(room_id.clone()) else {
            return None;
        };

        if !occupied.get_mut().remove(conn) {
            return None;
        }
        self.registry.detach_room(conn, room_id);

        let remaining: Vec<ConnectionId> = occupied.get().iter().copied().collect();
        debug!("{} left room {} ({} remaining)", conn, room_id, remaining.len());
        notify(&remaining);

        if remaining.is_empty() {
            occupied.remove();
            info!("Room {} is empty, removing it", room_id);
        }
        Some(remaining)
    }

    /// Snapshot of the member set; `None` means the room does not exist.
    pub fn members_of(&self, room_id: &RoomId) -> Option<HashSet<ConnectionId>> {
        self.rooms.get(room_id).map(|members| members.value().clone())
    }

    /// Runs `f` against the member set while holding the room's read guard,
    /// so no join or leave on that room interleaves with it.
    pub fn with_members<R>(&self, room_id: &RoomId, f: impl FnOnce(&HashSet<ConnectionId>) -> R) -> Option<R> {
        self.rooms.get(room_id).map(|members| f(members.value()))
    }

    pub fn rooms_of(&self, conn: &ConnectionId) -> HashSet<RoomId> {
        self.registry.rooms_of(conn)
    }

    pub fn participant_count(&self, room_id: &RoomId) -> Option<usize> {
        self.rooms.get(room_id).map(|members| members.len())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
