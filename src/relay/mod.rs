// src/relay/mod.rs

//! Per-project collaboration relay.
//!
//! Clients connect over WebSocket, join a project room and publish task or
//! resource changes; the relay fans each change out to the other members of
//! the room.
//!
//! - [`messages`]: JSON wire format.
//! - [`registry`]: connection ↔ room bookkeeping.
//! - [`core`]: pure state machine producing deliveries.
//! - [`hub`]: async single-writer loop around the core, plus [`RelayHandle`].
//! - [`ws`]: axum WebSocket transport.

pub mod core;
pub mod hub;
pub mod messages;
pub mod registry;
pub mod ws;

pub use self::core::{Delivery, RelayCore, RelayStep};
pub use hub::{spawn_relay, ChannelOutbox, Outbox, RelayCommand, RelayHandle, RelayHub};
pub use messages::{ClientMessage, InboundMessage, ServerEvent};
pub use registry::{ConnectionState, JoinOutcome, Registry};
pub use ws::{router, ConnectParams, RelayState, COLLABORATION_PATH};
