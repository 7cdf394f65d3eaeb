//! Domain event publishing.
//!
//! DESIGN
//! ======
//! Mutating service operations publish fire-and-forget events on a broadcast
//! bus. Publishing never blocks and never fails the originating operation:
//! an event with no live subscribers is simply dropped. A background logger
//! task subscribes at startup so every event leaves a trace line.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

const EVENT_BUS_CAPACITY: usize = 256;

/// Something that happened to the domain, emitted after the mutation commits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    ParentRegistered { parent_id: i64, username: String },
    ParentDeleted { parent_id: i64 },
    PictureChanged { parent_id: i64, url: String },
    ChildAdded { parent_id: i64, child_id: i64 },
    ActivityCreated { activity_id: i64, name: String },
    ChildEnrolled { child_id: i64, activity_id: i64 },
}

/// Envelope pairing an event with a unique id for downstream consumers.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub event: DomainEvent,
}

/// Broadcast bus for domain events. Cheap to clone; all clones share
/// the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { tx }
    }

    /// Publish an event. Best-effort: a bus with no subscribers drops the
    /// event silently.
    pub fn publish(&self, event: DomainEvent) {
        let envelope = EventEnvelope { id: Uuid::new_v4(), event };
        let _ = self.tx.send(envelope);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the background task that logs every published event.
pub fn spawn_event_logger(bus: &EventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    info!(event_id = %envelope.id, event = ?envelope.event, "domain event");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
