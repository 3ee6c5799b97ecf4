//! Internal event system for data-refresh notifications
//!
//! Route handlers publish a [`CatalogEvent`] after every successful
//! mutation; table shells subscribe and refresh their record snapshots.
//! The bus decouples the mutation surface from whoever is displaying the
//! data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted after successful dataset mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A record was created (or saved as a draft)
    Created {
        dataset: String,
        record_id: Uuid,
        data: serde_json::Value,
    },
    /// One or more records were updated via batched save
    Updated { dataset: String, record_ids: Vec<Uuid> },
    /// One or more records were deleted
    Deleted { dataset: String, record_ids: Vec<Uuid> },
}

impl CatalogEvent {
    /// Get the dataset this event relates to
    pub fn dataset(&self) -> &str {
        match self {
            CatalogEvent::Created { dataset, .. }
            | CatalogEvent::Updated { dataset, .. }
            | CatalogEvent::Deleted { dataset, .. } => dataset,
        }
    }

    /// Get the action name (created, updated, deleted)
    pub fn action(&self) -> &str {
        match self {
            CatalogEvent::Created { .. } => "created",
            CatalogEvent::Updated { .. } => "updated",
            CatalogEvent::Deleted { .. } => "deleted",
        }
    }
}

/// Envelope wrapping a catalog event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: CatalogEvent,
}

impl EventEnvelope {
    pub fn new(event: CatalogEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (Arc internally) and shareable across threads. If
/// subscribers are lagging past the channel capacity they receive a
/// `Lagged` error on their next recv().
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Non-blocking and never fails; with no subscribers the event is
    /// simply dropped. Returns the number of receivers.
    pub fn publish(&self, event: CatalogEvent) -> usize {
        let envelope = EventEnvelope::new(event);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
