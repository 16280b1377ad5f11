use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// One lifecycle entry, stamped relative to the timeline origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub at: Duration,
    pub kind: &'static str,
    pub message: String,
}

/// Shared, append-only log of run lifecycle events.
///
/// Clones append to the same log. Ordering is the order of `emit` calls.
#[derive(Debug, Clone)]
pub struct Timeline {
    origin: Instant,
    events: Arc<Mutex<Vec<Event>>>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn emit(&self, kind: &'static str, message: impl Into<String>) {
        let event = Event {
            at: self.origin.elapsed(),
            kind,
            message: message.into(),
        };
        debug!(kind, at_ms = event.at.as_millis() as u64, "{}", event.message);
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|e| e.kind).collect()
    }

    /// Time of the first event of `kind`, if any.
    pub fn first_at(&self, kind: &str) -> Option<Duration> {
        self.events
            .lock()
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.at)
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}
