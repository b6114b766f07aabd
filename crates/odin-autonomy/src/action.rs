use chrono::{DateTime, Utc};
use odin_core::{
    ActionId, ActionStatus, BoundaryId, CorrelationId, OverrideId, SafetyClassification, Subsystem,
};
use serde::{Deserialize, Serialize};

/// An instance of a proposed action, awaiting or having received a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousAction {
    pub id: ActionId,
    pub decision_boundary_id: BoundaryId,
    pub action: String,
    pub subsystem: Subsystem,
    /// Classification of the boundary at creation time. Kept on the action so
    /// a later boundary replacement cannot change how it is treated.
    pub safety_classification: SafetyClassification,
    pub confidence: u8,
    pub reasoning: Vec<String>,
    /// Opaque payload handed to whatever executes the command.
    pub execution_plan: serde_json::Value,
    pub human_override_deadline: DateTime<Utc>,
    pub status: ActionStatus,
    pub correlation_id: CorrelationId,
    pub created_at: DateTime<Utc>,
}

impl AutonomousAction {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now > self.human_override_deadline
    }

    pub fn is_critical(&self) -> bool {
        self.safety_classification.is_critical()
    }
}

/// Immutable record of an operator (or the system) cancelling a pending action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanOverride {
    pub id: OverrideId,
    pub autonomous_action_id: ActionId,
    pub operator_id: String,
    pub override_reason: String,
    pub alternative_action: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// `Some(false)` when the overridden action is safety-critical and a second
    /// operator still has to confirm. `None` when no second operator is needed.
    pub confirmed_by_second_operator: Option<bool>,
}

impl HumanOverride {
    pub fn needs_second_operator(&self) -> bool {
        self.confirmed_by_second_operator == Some(false)
    }
}
