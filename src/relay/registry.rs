// src/relay/registry.rs

//! Connection and room bookkeeping.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::types::{ConnectionId, ProjectId, UserId};

/// Lifecycle of a registered connection. Closed connections are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport open, no project joined yet.
    Connecting,
    Joined(ProjectId),
}

#[derive(Debug, Clone)]
struct Session {
    user_id: Option<UserId>,
    state: ConnectionState,
}

/// What a `join` changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Membership moved; `from` is the previous room, if any.
    Moved { from: Option<ProjectId> },
    /// Already in that room.
    Unchanged,
    UnknownConnection,
}

/// Which connection is in which room, kept consistent in both directions.
///
/// Holds no transport handles; only [`crate::relay::RelayCore`] mutates it.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
    rooms: HashMap<ProjectId, BTreeSet<ConnectionId>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId, user_id: Option<UserId>) {
        self.sessions.insert(
            id,
            Session {
                user_id,
                state: ConnectionState::Connecting,
            },
        );
    }

    pub fn join(&mut self, id: ConnectionId, project: ProjectId) -> JoinOutcome {
        let Some(session) = self.sessions.get_mut(&id) else {
            return JoinOutcome::UnknownConnection;
        };

        let from = match session.state {
            ConnectionState::Joined(current) if current == project => {
                return JoinOutcome::Unchanged;
            }
            ConnectionState::Joined(current) => Some(current),
            ConnectionState::Connecting => None,
        };

        session.state = ConnectionState::Joined(project);

        if let Some(old) = from {
            remove_from_room(&mut self.rooms, old, id);
        }
        self.rooms.entry(project).or_default().insert(id);

        debug!(connection = %id, project, ?from, "connection moved rooms");
        JoinOutcome::Moved { from }
    }

    /// Forget a connection. Returns its user id and last room.
    pub fn remove(&mut self, id: ConnectionId) -> Option<(Option<UserId>, Option<ProjectId>)> {
        let session = self.sessions.remove(&id)?;
        let project = match session.state {
            ConnectionState::Joined(project) => {
                remove_from_room(&mut self.rooms, project, id);
                Some(project)
            }
            ConnectionState::Connecting => None,
        };
        Some((session.user_id, project))
    }

    /// Snapshot of a room's members, ascending.
    pub fn members(&self, project: ProjectId) -> Vec<ConnectionId> {
        self.rooms
            .get(&project)
            .map(|room| room.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn state_of(&self, id: ConnectionId) -> Option<ConnectionState> {
        self.sessions.get(&id).map(|s| s.state)
    }

    pub fn project_of(&self, id: ConnectionId) -> Option<ProjectId> {
        match self.state_of(id)? {
            ConnectionState::Joined(project) => Some(project),
            ConnectionState::Connecting => None,
        }
    }

    pub fn user_of(&self, id: ConnectionId) -> Option<UserId> {
        self.sessions.get(&id).and_then(|s| s.user_id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

fn remove_from_room(
    rooms: &mut HashMap<ProjectId, BTreeSet<ConnectionId>>,
    project: ProjectId,
    id: ConnectionId,
) {
    if let Some(room) = rooms.get_mut(&project) {
        room.remove(&id);
        if room.is_empty() {
            rooms.remove(&project);
        }
    }
}
