use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::{MissionPhase, Subsystem};

/// Governor state transitions, published for dashboards and audit consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    // ── Action lifecycle ───────────────────────────────────────
    ActionCreated {
        action_id: Uuid,
        boundary_id: String,
        subsystem: Subsystem,
        action: String,
        deadline: DateTime<Utc>,
    },
    ActionOverridden {
        action_id: Uuid,
        override_id: Uuid,
        operator_id: String,
        reason: String,
        needs_second_operator: bool,
    },
    ActionExecuted {
        action_id: Uuid,
    },
    ActionExpired {
        action_id: Uuid,
        deadline: DateTime<Utc>,
    },

    // ── Governor mode ──────────────────────────────────────────
    EmergencyModeActivated {
        reason: String,
        overridden: usize,
    },
    EmergencyModeDeactivated,
    MissionPhaseChanged {
        from: MissionPhase,
        to: MissionPhase,
    },
    BoundariesTightened {
        phase: MissionPhase,
        count: usize,
    },
    BoundariesRestored {
        phase: MissionPhase,
        count: usize,
    },

    // ── Boundary table ─────────────────────────────────────────
    BoundaryUpdated {
        boundary_id: String,
        subsystem: Subsystem,
        action: String,
        replaced: Option<String>,
    },
    BoundaryRemoved {
        boundary_id: String,
    },
}

/// A broadcast-based event bus for governor pub/sub.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<Event>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn publish(&self, event: Event) {
        // Ignore send errors (no subscribers).
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}
