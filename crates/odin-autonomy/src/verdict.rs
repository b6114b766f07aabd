use odin_core::{AutonomyLevel, BoundaryId, SafetyClassification, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::level::ConfidenceTier;

/// Coarse health of a subsystem or of the whole vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Nominal,
    Degraded,
    Critical,
    Offline,
}

impl HealthStatus {
    pub fn is_impaired(&self) -> bool {
        matches!(self, Self::Critical | Self::Offline)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nominal => "nominal",
            Self::Degraded => "degraded",
            Self::Critical => "critical",
            Self::Offline => "offline",
        })
    }
}

/// Health snapshot supplied by the caller alongside a proposed action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemHealthSummary {
    pub overall: HealthStatus,
    #[serde(default)]
    pub subsystems: HashMap<Subsystem, HealthStatus>,
    #[serde(default)]
    pub active_alerts: Vec<String>,
}

impl SystemHealthSummary {
    pub fn nominal() -> Self {
        Self::default()
    }

    pub fn with_subsystem(mut self, subsystem: Subsystem, status: HealthStatus) -> Self {
        self.subsystems.insert(subsystem, status);
        self
    }

    pub fn status_of(&self, subsystem: Subsystem) -> HealthStatus {
        self.subsystems.get(&subsystem).copied().unwrap_or(self.overall)
    }
}

/// Why a verdict withholds autonomous execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    NoBoundary,
    PhaseRestricted,
    EmergencyMode,
    InsufficientConfidence,
    ManualOnly,
}

impl Denial {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoBoundary => "no boundary defined",
            Self::PhaseRestricted => "restricted in current mission phase",
            Self::EmergencyMode => "emergency mode active",
            Self::InsufficientConfidence => "confidence below advisory tier",
            Self::ManualOnly => "boundary requires manual control",
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of evaluating a proposed action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub can_execute: bool,
    pub autonomy_level: AutonomyLevel,
    /// Set by the confidence tier: anything below full autonomy needs an
    /// operator's confirmation.
    pub requires_confirmation: bool,
    /// The matched boundary asks for human confirmation, either as written or
    /// because a critical mission phase tightened it.
    pub boundary_requires_confirmation: bool,
    /// Seconds until execution when allowed.
    pub time_to_execution_secs: Option<u64>,
    pub boundary_id: Option<BoundaryId>,
    pub safety_classification: Option<SafetyClassification>,
    pub tier: ConfidenceTier,
    pub meets_boundary_threshold: bool,
    pub denial: Option<Denial>,
    /// Caller reasoning followed by the governor's rationale.
    pub reasoning: Vec<String>,
}

impl Verdict {
    pub(crate) fn deny(denial: Denial, tier: ConfidenceTier, reasoning: Vec<String>) -> Self {
        Self {
            can_execute: false,
            autonomy_level: AutonomyLevel::Manual,
            requires_confirmation: true,
            boundary_requires_confirmation: false,
            time_to_execution_secs: None,
            boundary_id: None,
            safety_classification: None,
            tier,
            meets_boundary_threshold: false,
            denial: Some(denial),
            reasoning,
        }
    }
}
