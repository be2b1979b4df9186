// src/relay/core.rs

//! Pure relay state machine.
//!
//! [`RelayCore`] owns the [`Registry`] and turns every operation into a
//! [`RelayStep`]: the events to deliver and, for client messages, the copy to
//! surface to the application. It performs no IO and holds no channels, so
//! the async shell in [`crate::relay::hub`] is the only place deliveries can
//! fail.

use tracing::{debug, info, warn};

use crate::relay::messages::{ClientMessage, InboundMessage, ServerEvent, INVALID_MESSAGE, NOT_JOINED};
use crate::relay::registry::{JoinOutcome, Registry};
use crate::types::{ConnectionId, ProjectId, UserId};

/// One event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

/// Output of a single core operation.
#[derive(Debug, Clone, Default)]
pub struct RelayStep {
    pub deliveries: Vec<Delivery>,
    pub inbound: Option<InboundMessage>,
}

impl RelayStep {
    fn with_deliveries(deliveries: Vec<Delivery>) -> Self {
        Self {
            deliveries,
            inbound: None,
        }
    }

    fn reply(to: ConnectionId, event: ServerEvent) -> Self {
        Self::with_deliveries(vec![Delivery { to, event }])
    }
}

#[derive(Debug, Default)]
pub struct RelayCore {
    registry: Registry,
    next_id: u64,
}

impl RelayCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a new connection and greet it.
    ///
    /// `project` is the room requested at connect time (the `projectId`
    /// query parameter); when present the connection joins it immediately.
    pub fn connect(
        &mut self,
        user_id: Option<UserId>,
        project: Option<ProjectId>,
    ) -> (ConnectionId, RelayStep) {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.registry.register(id, user_id);
        info!(connection = %id, ?user_id, ?project, "client connected");

        let mut step = RelayStep::reply(
            id,
            ServerEvent::ConnectionEstablished {
                client_id: id.to_string(),
            },
        );

        if let Some(project) = project {
            step.deliveries.extend(self.join(id, project).deliveries);
        }

        (id, step)
    }

    /// Move `connection` into `project`. Peers already in the room are told
    /// about the newcomer; repeating the same join does nothing.
    pub fn join(&mut self, connection: ConnectionId, project: ProjectId) -> RelayStep {
        match self.registry.join(connection, project) {
            JoinOutcome::Moved { from } => {
                info!(connection = %connection, project, ?from, "client joined project");
                let user_id = self.registry.user_of(connection);
                self.publish(project, ServerEvent::UserJoined { user_id }, Some(connection))
            }
            JoinOutcome::Unchanged => {
                debug!(connection = %connection, project, "join for current project; no change");
                RelayStep::default()
            }
            JoinOutcome::UnknownConnection => {
                warn!(connection = %connection, project, "join from unknown connection; ignoring");
                RelayStep::default()
            }
        }
    }

    /// Address `event` to every member of `project` except `exclude`.
    pub fn publish(
        &self,
        project: ProjectId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> RelayStep {
        let deliveries: Vec<Delivery> = self
            .registry
            .members(project)
            .into_iter()
            .filter(|&member| Some(member) != exclude)
            .map(|to| Delivery {
                to,
                event: event.clone(),
            })
            .collect();

        debug!(
            project,
            kind = event.kind(),
            recipients = deliveries.len(),
            "publishing to project room"
        );

        RelayStep::with_deliveries(deliveries)
    }

    /// Drop a connection and tell its last room, if any.
    pub fn leave(&mut self, connection: ConnectionId) -> RelayStep {
        match self.registry.remove(connection) {
            Some((user_id, Some(project))) => {
                info!(connection = %connection, project, "client left project");
                self.publish(project, ServerEvent::UserLeft { user_id }, None)
            }
            Some((_, None)) => {
                info!(connection = %connection, "client disconnected before joining a project");
                RelayStep::default()
            }
            None => {
                debug!(connection = %connection, "leave for unknown connection; ignoring");
                RelayStep::default()
            }
        }
    }

    /// Apply a raw text payload received from `connection`.
    ///
    /// Anything that fails to parse is answered with an `error` event to the
    /// sender alone.
    pub fn handle_inbound(&mut self, connection: ConnectionId, payload: &str) -> RelayStep {
        if !self.registry.contains(connection) {
            warn!(connection = %connection, "message from unknown connection; ignoring");
            return RelayStep::default();
        }

        let message = match serde_json::from_str::<ClientMessage>(payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(connection = %connection, error = %e, "failed to parse client message");
                return RelayStep::reply(connection, ServerEvent::error(INVALID_MESSAGE));
            }
        };

        debug!(connection = %connection, kind = message.kind(), "client message");
        let user_id = self.registry.user_of(connection);

        let mut step = match &message {
            ClientMessage::JoinProject { project_id } => self.join(connection, *project_id),
            ClientMessage::TaskUpdate { task } => {
                let event = ServerEvent::TaskUpdated {
                    task: task.clone(),
                    updated_by: user_id,
                };
                match self.publish_from(connection, event) {
                    Some(step) => step,
                    None => return RelayStep::reply(connection, ServerEvent::error(NOT_JOINED)),
                }
            }
            ClientMessage::ResourceAssignment { assignment } => {
                let event = ServerEvent::ResourceAssigned {
                    assignment: assignment.clone(),
                    updated_by: user_id,
                };
                match self.publish_from(connection, event) {
                    Some(step) => step,
                    None => return RelayStep::reply(connection, ServerEvent::error(NOT_JOINED)),
                }
            }
        };

        step.inbound = Some(InboundMessage {
            connection,
            user_id,
            project: self.registry.project_of(connection),
            message,
        });
        step
    }

    /// Publish to the sender's room, excluding the sender. `None` if the
    /// sender has not joined a project.
    fn publish_from(&self, connection: ConnectionId, event: ServerEvent) -> Option<RelayStep> {
        let Some(project) = self.registry.project_of(connection) else {
            warn!(
                connection = %connection,
                kind = event.kind(),
                "update from connection without a project; rejecting"
            );
            return None;
        };
        Some(self.publish(project, event, Some(connection)))
    }
}
