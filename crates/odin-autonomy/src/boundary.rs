use chrono::{DateTime, Duration, Utc};
use odin_config::BoundaryConfig;
use odin_core::{
    AutonomyLevel, BoundaryId, MissionPhase, OdinError, SafetyClassification, Subsystem,
};
use serde::{Deserialize, Serialize};

/// Static policy row for one `(subsystem, action)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionBoundary {
    pub id: BoundaryId,
    pub subsystem: Subsystem,
    pub action: String,
    /// The most autonomy ever grantable under this boundary.
    pub autonomy_level: AutonomyLevel,
    /// Minimum confidence (0-100) the boundary expects before acting.
    pub confidence_threshold: u8,
    /// Seconds an operator has to override before the action must execute.
    pub time_constraint_secs: u64,
    pub requires_human_confirmation: bool,
    pub safety_classification: SafetyClassification,
    /// Phases during which this boundary is disabled.
    pub mission_phase_restrictions: Vec<MissionPhase>,
    pub last_updated: DateTime<Utc>,
}

impl DecisionBoundary {
    pub fn new(
        id: impl Into<BoundaryId>,
        subsystem: Subsystem,
        action: impl Into<String>,
        autonomy_level: AutonomyLevel,
        confidence_threshold: u8,
        time_constraint_secs: u64,
        safety_classification: SafetyClassification,
    ) -> Self {
        Self {
            id: id.into(),
            subsystem,
            action: action.into(),
            autonomy_level,
            confidence_threshold,
            time_constraint_secs,
            requires_human_confirmation: false,
            safety_classification,
            mission_phase_restrictions: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn with_confirmation(mut self) -> Self {
        self.requires_human_confirmation = true;
        self
    }

    pub fn restricted_in(mut self, phases: impl IntoIterator<Item = MissionPhase>) -> Self {
        self.mission_phase_restrictions.extend(phases);
        self
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = at;
        self
    }

    pub fn from_config(config: &BoundaryConfig, now: DateTime<Utc>) -> Self {
        Self {
            id: config.id.clone(),
            subsystem: config.subsystem,
            action: config.action.clone(),
            autonomy_level: config.autonomy_level,
            confidence_threshold: config.confidence_threshold,
            time_constraint_secs: config.time_constraint_secs,
            requires_human_confirmation: config.requires_human_confirmation,
            safety_classification: config.safety_classification,
            mission_phase_restrictions: config.mission_phase_restrictions.clone(),
            last_updated: now,
        }
    }

    pub fn time_constraint(&self) -> Duration {
        i64::try_from(self.time_constraint_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    pub fn is_restricted_in(&self, phase: MissionPhase) -> bool {
        self.mission_phase_restrictions.contains(&phase)
    }

    pub fn is_critical(&self) -> bool {
        self.safety_classification.is_critical()
    }

    pub fn validate(&self) -> odin_core::Result<()> {
        let invalid = |reason: &str| OdinError::InvalidBoundary {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("id is empty"));
        }
        if self.action.trim().is_empty() {
            return Err(invalid("action is empty"));
        }
        if self.confidence_threshold > 100 {
            return Err(invalid("confidence threshold above 100"));
        }
        if self.time_constraint_secs == 0 {
            return Err(invalid("time constraint must be at least one second"));
        }
        Ok(())
    }
}

/// The built-in boundary table loaded on construction.
pub fn default_boundaries(now: DateTime<Utc>) -> Vec<DecisionBoundary> {
    use AutonomyLevel::*;
    use SafetyClassification::*;

    vec![
        // ── Power ───
        DecisionBoundary::new(
            "power-load-shed",
            Subsystem::Power,
            "shed_non_critical_loads",
            Full,
            95,
            30,
            Caution,
        ),
        DecisionBoundary::new(
            "power-backup-battery",
            Subsystem::Power,
            "switch_to_backup_battery",
            Advisory,
            85,
            60,
            Warning,
        )
        .with_confirmation(),
        // ── Thermal ───
        DecisionBoundary::new(
            "thermal-radiator-deploy",
            Subsystem::Thermal,
            "deploy_radiator_panels",
            Full,
            90,
            120,
            Routine,
        )
        .restricted_in([MissionPhase::Launch]),
        DecisionBoundary::new(
            "thermal-heater-setpoint",
            Subsystem::Thermal,
            "adjust_heater_setpoints",
            Full,
            85,
            300,
            Routine,
        ),
        // ── Comms ───
        DecisionBoundary::new(
            "comms-backup-antenna",
            Subsystem::Comms,
            "switch_to_backup_antenna",
            Full,
            90,
            30,
            Caution,
        ),
        DecisionBoundary::new(
            "comms-emergency-beacon",
            Subsystem::Comms,
            "enable_emergency_beacon",
            Full,
            80,
            10,
            Critical,
        ),
        // ── Navigation ───
        DecisionBoundary::new(
            "nav-trajectory-correction",
            Subsystem::Navigation,
            "trajectory_correction",
            Advisory,
            95,
            300,
            Warning,
        )
        .with_confirmation()
        .restricted_in([MissionPhase::Launch, MissionPhase::Landing]),
        DecisionBoundary::new(
            "nav-collision-avoidance",
            Subsystem::Navigation,
            "collision_avoidance_maneuver",
            Full,
            90,
            10,
            Critical,
        ),
        // ── Propulsion ───
        DecisionBoundary::new(
            "propulsion-main-engine-burn",
            Subsystem::Propulsion,
            "main_engine_burn",
            Manual,
            99,
            600,
            Critical,
        )
        .with_confirmation()
        .restricted_in([MissionPhase::Launch]),
    ]
    .into_iter()
    .map(|b| b.updated_at(now))
    .collect()
}
