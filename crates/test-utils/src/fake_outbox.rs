use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use critpath::errors::{CritpathError, Result};
use critpath::relay::{Outbox, ServerEvent};

/// An outbox that keeps every delivered event for later inspection.
///
/// Clones share the same buffer, so a test can hand one clone to the relay
/// and read from the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutbox {
    events: Arc<Mutex<Vec<ServerEvent>>>,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of recorded events with the given wire `type`.
    pub fn count_of(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }
}

impl Outbox for RecordingOutbox {
    fn try_deliver(&self, event: ServerEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// An outbox whose peer is gone: every delivery fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingOutbox;

impl Outbox for FailingOutbox {
    fn try_deliver(&self, _event: ServerEvent) -> Result<()> {
        Err(CritpathError::Other(anyhow!("peer connection reset")))
    }
}
