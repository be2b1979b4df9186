// src/relay/messages.rs

//! JSON wire format of the collaboration channel.
//!
//! Every message is an object with a `type` discriminant; field names are
//! camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::types::{ConnectionId, ProjectId, UserId};

/// Reply sent to a client whose payload could not be understood.
pub const INVALID_MESSAGE: &str = "Invalid message format";

/// Reply sent when a client publishes before joining a project.
pub const NOT_JOINED: &str = "Join a project before publishing updates";

/// Messages a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinProject { project_id: ProjectId },
    TaskUpdate { task: Value },
    ResourceAssignment { assignment: Value },
}

impl ClientMessage {
    /// The wire discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::JoinProject { .. } => "join_project",
            ClientMessage::TaskUpdate { .. } => "task_update",
            ClientMessage::ResourceAssignment { .. } => "resource_assignment",
        }
    }
}

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    ConnectionEstablished {
        client_id: String,
    },
    TaskUpdated {
        task: Value,
        updated_by: Option<UserId>,
    },
    ResourceAssigned {
        assignment: Value,
        updated_by: Option<UserId>,
    },
    UserJoined {
        user_id: Option<UserId>,
    },
    UserLeft {
        user_id: Option<UserId>,
    },
    Error {
        error: String,
    },
}

impl ServerEvent {
    pub fn error(msg: impl Into<String>) -> Self {
        ServerEvent::Error { error: msg.into() }
    }

    /// Encode for a text frame.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The wire discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::ConnectionEstablished { .. } => "connection_established",
            ServerEvent::TaskUpdated { .. } => "task_updated",
            ServerEvent::ResourceAssigned { .. } => "resource_assigned",
            ServerEvent::UserJoined { .. } => "user_joined",
            ServerEvent::UserLeft { .. } => "user_left",
            ServerEvent::Error { .. } => "error",
        }
    }
}

/// An accepted client message, surfaced to the application.
///
/// The relay has already fanned it out to peers; this copy lets calling code
/// persist the change or trigger a schedule recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub connection: ConnectionId,
    pub user_id: Option<UserId>,
    /// Project the sender belongs to after the message was applied.
    pub project: Option<ProjectId>,
    pub message: ClientMessage,
}
