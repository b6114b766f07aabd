use odin_core::AutonomyLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence at or above which full autonomy can be granted.
pub const FULL_AUTONOMY_CONFIDENCE: u8 = 95;

/// Confidence at or above which advisory autonomy can be granted.
pub const ADVISORY_CONFIDENCE: u8 = 80;

/// Seconds before a fully autonomous action executes.
pub const FULL_AUTONOMY_EXECUTION_SECS: u64 = 5;

/// Fixed confidence tiers:
///
/// - **High** (≥ 95): up to full autonomy, no confirmation.
/// - **Moderate** (80..95): up to advisory autonomy, confirmation required.
/// - **Low** (< 80): manual only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Moderate,
    High,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= FULL_AUTONOMY_CONFIDENCE {
            Self::High
        } else if confidence >= ADVISORY_CONFIDENCE {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// The most autonomy this tier can justify on its own.
    pub fn ceiling(&self) -> AutonomyLevel {
        match self {
            Self::High => AutonomyLevel::Full,
            Self::Moderate => AutonomyLevel::Advisory,
            Self::Low => AutonomyLevel::Manual,
        }
    }

    /// Autonomy actually granted, capped by what the boundary allows.
    pub fn grant(&self, boundary_level: AutonomyLevel) -> AutonomyLevel {
        self.ceiling().min(boundary_level)
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        })
    }
}
