use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::OdinError;

/// Unique identifier for a decision boundary (e.g. `"power-load-shed"`).
pub type BoundaryId = String;

/// Unique identifier for an autonomous action instance.
pub type ActionId = Uuid;

/// Unique identifier for a human override record.
pub type OverrideId = Uuid;

/// Caller-supplied identifier tying an action back to the analysis that proposed it.
pub type CorrelationId = String;

/// Spacecraft subsystems that can own a decision boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subsystem {
    Power,
    Thermal,
    Comms,
    Navigation,
    Propulsion,
    LifeSupport,
    AttitudeControl,
}

impl Subsystem {
    pub const ALL: [Subsystem; 7] = [
        Self::Power,
        Self::Thermal,
        Self::Comms,
        Self::Navigation,
        Self::Propulsion,
        Self::LifeSupport,
        Self::AttitudeControl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Thermal => "thermal",
            Self::Comms => "comms",
            Self::Navigation => "navigation",
            Self::Propulsion => "propulsion",
            Self::LifeSupport => "life_support",
            Self::AttitudeControl => "attitude_control",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subsystem {
    type Err = OdinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "power" => Ok(Self::Power),
            "thermal" => Ok(Self::Thermal),
            "comms" | "communications" => Ok(Self::Comms),
            "navigation" | "nav" => Ok(Self::Navigation),
            "propulsion" => Ok(Self::Propulsion),
            "life_support" => Ok(Self::LifeSupport),
            "attitude_control" | "attitude" => Ok(Self::AttitudeControl),
            _ => Err(OdinError::UnknownSubsystem(s.to_string())),
        }
    }
}

/// Mission phases the governor tracks.
///
/// Launch, landing and emergency are the critical phases: entering one of
/// them tightens every non-routine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
    PreLaunch,
    Launch,
    #[default]
    Cruise,
    OrbitInsertion,
    Orbit,
    Landing,
    SurfaceOperations,
    Emergency,
}

impl MissionPhase {
    pub const ALL: [MissionPhase; 8] = [
        Self::PreLaunch,
        Self::Launch,
        Self::Cruise,
        Self::OrbitInsertion,
        Self::Orbit,
        Self::Landing,
        Self::SurfaceOperations,
        Self::Emergency,
    ];

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Launch | Self::Landing | Self::Emergency)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreLaunch => "pre_launch",
            Self::Launch => "launch",
            Self::Cruise => "cruise",
            Self::OrbitInsertion => "orbit_insertion",
            Self::Orbit => "orbit",
            Self::Landing => "landing",
            Self::SurfaceOperations => "surface_operations",
            Self::Emergency => "emergency",
        }
    }
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissionPhase {
    type Err = OdinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| OdinError::UnknownMissionPhase(s.to_string()))
    }
}

/// How much human involvement an action needs.
///
/// Ordered from least to most autonomous, so `min` of two levels is the
/// more restrictive one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyLevel {
    /// An operator must perform the action.
    Manual,
    /// The governor may act once an operator confirms.
    Advisory,
    /// The governor may act on its own.
    Full,
}

impl AutonomyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Advisory => "advisory",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for AutonomyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tag of a boundary, independent of its autonomy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyClassification {
    Routine,
    Caution,
    Warning,
    Critical,
}

impl SafetyClassification {
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }

    pub fn is_routine(&self) -> bool {
        matches!(self, Self::Routine)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Caution => "caution",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for SafetyClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an autonomous action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Overridden,
    Executed,
    Expired,
}

impl ActionStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Overridden => "overridden",
            Self::Executed => "executed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
