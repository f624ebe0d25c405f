use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::catalog::AppId;

/// Every state change in the blocker produces an Event.
/// Operations return their result directly; observers subscribe here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    AppsSelected {
        apps: Vec<AppId>,
        at: DateTime<Utc>,
    },
    BlockStarted {
        apps: Vec<AppId>,
        duration_min: u32,
        expires_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Block ran its full length.
    BlockExpired {
        expired_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Block lifted early by a correct answer.
    Unblocked {
        question: String,
        at: DateTime<Utc>,
    },
    UnblockRejected {
        question: String,
        at: DateTime<Utc>,
    },
    ProblemIssued {
        question: String,
        at: DateTime<Utc>,
    },
    CategoryChanged {
        category: String,
        change: CategoryChange,
        at: DateTime<Utc>,
    },
}

/// What happened to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryChange {
    Created,
    Deleted,
    Renamed { from: String },
    AppAdded { app: AppId },
    AppRemoved { app: AppId },
}

/// Fan-out of events to any number of subscribers.
///
/// Publishing with nobody listening is fine; slow subscribers drop the
/// oldest events and see `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) {
        // Err only means there are no receivers right now.
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
