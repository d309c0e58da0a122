use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    UserStats,
    Workouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// Which change kinds a subscriber wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventMask {
    insert: bool,
    update: bool,
}

impl EventMask {
    pub const INSERT: Self = Self { insert: true, update: false };
    pub const UPDATE: Self = Self { insert: false, update: true };
    pub const ALL: Self = Self { insert: true, update: true };

    pub fn matches(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Insert => self.insert,
            ChangeKind::Update => self.update,
        }
    }
}

/// A row written to a table, as pushed to realtime subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub event_type: ChangeKind,
    pub user_id: Uuid,
    pub new: serde_json::Value,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(table: Table, event_type: ChangeKind, user_id: Uuid, row: &T) -> Self {
        Self {
            table,
            event_type,
            user_id,
            new: serde_json::to_value(row).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire and forget; having no subscribers is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self, table: Table, mask: EventMask) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            table,
            mask,
        }
    }
}

/// Filtered view of the feed. Dropping it unsubscribes.
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    table: Table,
    mask: EventMask,
}

impl Subscription {
    /// Next matching event, or `None` once the feed is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.table == self.table && self.mask.matches(event.event_type) => {
                    return Some(event)
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped = skipped, "Change feed subscriber lagged");
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
