//! Collection-changed notifications.
//!
//! Writers publish which collection changed and the revision it produced.
//! Subscribers re-query the collection; events carry no record data.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// The collections a change event can name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Staff,
    Roles,
    Tasks,
    Messages,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Staff => "staff",
            Collection::Roles => "roles",
            Collection::Tasks => "tasks",
            Collection::Messages => "messages",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: Collection,
    pub revision_id: i64,
}

/// Fan-out bus for change events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a change. Having no subscribers is not an error.
    pub fn publish(&self, collection: Collection, revision_id: i64) {
        let delivered = self
            .tx
            .send(ChangeEvent {
                collection,
                revision_id,
            })
            .unwrap_or(0);
        tracing::debug!(
            collection = collection.as_str(),
            revision_id,
            delivered,
            "Published change event"
        );
    }
}
