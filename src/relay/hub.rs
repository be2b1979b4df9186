// src/relay/hub.rs

//! Async shell around [`RelayCore`].
//!
//! The hub task is the single writer of relay state: every operation arrives
//! as a [`RelayCommand`] on one mpsc channel and is applied in order. The
//! resulting deliveries are pushed into per-connection [`Outbox`]es without
//! waiting, so a slow peer cannot hold up the others.

use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{CritpathError, Result};
use crate::relay::core::{RelayCore, RelayStep};
use crate::relay::messages::{InboundMessage, ServerEvent};
use crate::types::{ConnectionId, ProjectId, UserId};

/// Where the hub puts events for one connection.
///
/// Production uses [`ChannelOutbox`]; tests can plug in outboxes that fail or
/// record.
pub trait Outbox: Send {
    /// Queue `event` without blocking. An error means the event was dropped.
    fn try_deliver(&self, event: ServerEvent) -> Result<()>;
}

/// Bounded tokio channel drained by the connection's writer task.
pub struct ChannelOutbox {
    tx: mpsc::Sender<ServerEvent>,
}

impl ChannelOutbox {
    pub fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { tx }
    }
}

impl Outbox for ChannelOutbox {
    fn try_deliver(&self, event: ServerEvent) -> Result<()> {
        self.tx
            .try_send(event)
            .map_err(|e| CritpathError::Other(anyhow!("outbox rejected event: {e}")))
    }
}

/// Operations accepted by the hub.
pub enum RelayCommand {
    Connect {
        user_id: Option<UserId>,
        project: Option<ProjectId>,
        outbox: Box<dyn Outbox>,
        reply: oneshot::Sender<ConnectionId>,
    },
    Join {
        connection: ConnectionId,
        project: ProjectId,
    },
    Publish {
        project: ProjectId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    },
    Inbound {
        connection: ConnectionId,
        payload: String,
    },
    Leave {
        connection: ConnectionId,
    },
    Members {
        project: ProjectId,
        reply: oneshot::Sender<Vec<ConnectionId>>,
    },
    Shutdown,
}

impl fmt::Debug for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayCommand::Connect { user_id, project, .. } => f
                .debug_struct("Connect")
                .field("user_id", user_id)
                .field("project", project)
                .finish_non_exhaustive(),
            RelayCommand::Join { connection, project } => f
                .debug_struct("Join")
                .field("connection", connection)
                .field("project", project)
                .finish(),
            RelayCommand::Publish { project, event, exclude } => f
                .debug_struct("Publish")
                .field("project", project)
                .field("kind", &event.kind())
                .field("exclude", exclude)
                .finish(),
            RelayCommand::Inbound { connection, payload } => f
                .debug_struct("Inbound")
                .field("connection", connection)
                .field("bytes", &payload.len())
                .finish(),
            RelayCommand::Leave { connection } => f
                .debug_struct("Leave")
                .field("connection", connection)
                .finish(),
            RelayCommand::Members { project, .. } => f
                .debug_struct("Members")
                .field("project", project)
                .finish_non_exhaustive(),
            RelayCommand::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Owns the core, the outboxes and the application-facing inbound stream.
pub struct RelayHub {
    core: RelayCore,
    outboxes: HashMap<ConnectionId, Box<dyn Outbox>>,
    command_rx: mpsc::Receiver<RelayCommand>,
    inbound_tx: mpsc::Sender<InboundMessage>,
}

impl fmt::Debug for RelayHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayHub")
            .field("core", &self.core)
            .field("outboxes", &self.outboxes.len())
            .finish_non_exhaustive()
    }
}

impl RelayHub {
    pub fn new(
        command_rx: mpsc::Receiver<RelayCommand>,
        inbound_tx: mpsc::Sender<InboundMessage>,
    ) -> Self {
        Self {
            core: RelayCore::new(),
            outboxes: HashMap::new(),
            command_rx,
            inbound_tx,
        }
    }

    /// Main event loop. Returns once every [`RelayHandle`] is dropped or a
    /// shutdown command arrives.
    pub async fn run(mut self) {
        info!("collaboration relay started");

        while let Some(command) = self.command_rx.recv().await {
            debug!(?command, "relay received command");

            match command {
                RelayCommand::Connect {
                    user_id,
                    project,
                    outbox,
                    reply,
                } => {
                    let (id, step) = self.core.connect(user_id, project);
                    self.outboxes.insert(id, outbox);
                    self.dispatch(step);
                    if reply.send(id).is_err() {
                        // Caller went away before learning its id.
                        let step = self.core.leave(id);
                        self.outboxes.remove(&id);
                        self.dispatch(step);
                    }
                }
                RelayCommand::Join {
                    connection,
                    project,
                } => {
                    let step = self.core.join(connection, project);
                    self.dispatch(step);
                }
                RelayCommand::Publish {
                    project,
                    event,
                    exclude,
                } => {
                    let step = self.core.publish(project, event, exclude);
                    self.dispatch(step);
                }
                RelayCommand::Inbound {
                    connection,
                    payload,
                } => {
                    let step = self.core.handle_inbound(connection, &payload);
                    self.dispatch(step);
                }
                RelayCommand::Leave { connection } => {
                    self.outboxes.remove(&connection);
                    let step = self.core.leave(connection);
                    self.dispatch(step);
                }
                RelayCommand::Members { project, reply } => {
                    let _ = reply.send(self.core.registry().members(project));
                }
                RelayCommand::Shutdown => {
                    info!("relay shutdown requested");
                    break;
                }
            }
        }

        info!(
            connections = self.core.registry().connection_count(),
            "collaboration relay stopped"
        );
    }

    /// Deliver a step's events. Failures are logged per recipient and never
    /// stop delivery to the rest.
    fn dispatch(&mut self, step: RelayStep) {
        for delivery in step.deliveries {
            let kind = delivery.event.kind();
            match self.outboxes.get(&delivery.to) {
                Some(outbox) => {
                    if let Err(e) = outbox.try_deliver(delivery.event) {
                        warn!(
                            connection = %delivery.to,
                            kind,
                            error = %e,
                            "failed to deliver event; skipping peer"
                        );
                    }
                }
                None => {
                    warn!(connection = %delivery.to, kind, "no outbox for connection");
                }
            }
        }

        if let Some(inbound) = step.inbound {
            if let Err(e) = self.inbound_tx.try_send(inbound) {
                warn!(error = %e, "application inbound stream unavailable; dropping message");
            }
        }
    }
}

/// Cloneable front door to a running [`RelayHub`].
#[derive(Debug, Clone)]
pub struct RelayHandle {
    tx: mpsc::Sender<RelayCommand>,
    outbox_capacity: usize,
}

impl RelayHandle {
    pub fn new(tx: mpsc::Sender<RelayCommand>, outbox_capacity: usize) -> Self {
        Self {
            tx,
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Register a connection backed by a fresh bounded channel.
    pub async fn connect(
        &self,
        user_id: Option<UserId>,
        project: Option<ProjectId>,
    ) -> Result<(ConnectionId, mpsc::Receiver<ServerEvent>)> {
        let (tx, rx) = mpsc::channel(self.outbox_capacity);
        let id = self
            .connect_with(user_id, project, Box::new(ChannelOutbox::new(tx)))
            .await?;
        Ok((id, rx))
    }

    /// Register a connection with a caller-supplied outbox.
    pub async fn connect_with(
        &self,
        user_id: Option<UserId>,
        project: Option<ProjectId>,
        outbox: Box<dyn Outbox>,
    ) -> Result<ConnectionId> {
        let (reply, id_rx) = oneshot::channel();
        self.send(RelayCommand::Connect {
            user_id,
            project,
            outbox,
            reply,
        })
        .await?;
        id_rx.await.map_err(|_| CritpathError::RelayClosed)
    }

    pub async fn join(&self, connection: ConnectionId, project: ProjectId) -> Result<()> {
        self.send(RelayCommand::Join {
            connection,
            project,
        })
        .await
    }

    pub async fn publish(
        &self,
        project: ProjectId,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) -> Result<()> {
        self.send(RelayCommand::Publish {
            project,
            event,
            exclude,
        })
        .await
    }

    /// Hand a raw client payload to the relay.
    pub async fn inbound(&self, connection: ConnectionId, payload: String) -> Result<()> {
        self.send(RelayCommand::Inbound {
            connection,
            payload,
        })
        .await
    }

    pub async fn leave(&self, connection: ConnectionId) -> Result<()> {
        self.send(RelayCommand::Leave { connection }).await
    }

    /// Current members of a project room, ascending.
    pub async fn members(&self, project: ProjectId) -> Result<Vec<ConnectionId>> {
        let (reply, rx) = oneshot::channel();
        self.send(RelayCommand::Members { project, reply }).await?;
        rx.await.map_err(|_| CritpathError::RelayClosed)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(RelayCommand::Shutdown).await
    }

    async fn send(&self, command: RelayCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| CritpathError::RelayClosed)
    }
}

/// Spawn a hub on the current runtime.
///
/// Returns the handle, the stream of accepted client messages for the
/// application, and the hub's join handle.
pub fn spawn_relay(
    outbox_capacity: usize,
) -> (RelayHandle, mpsc::Receiver<InboundMessage>, JoinHandle<()>) {
    let (command_tx, command_rx) = mpsc::channel(256);
    let (inbound_tx, inbound_rx) = mpsc::channel(256);

    let hub = RelayHub::new(command_rx, inbound_tx);
    let join = tokio::spawn(hub.run());

    (RelayHandle::new(command_tx, outbox_capacity), inbound_rx, join)
}
