use odin_core::{AutonomyLevel, MissionPhase, SafetyClassification, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Root configuration, maps to `odin.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OdinConfig {
    pub governor: GovernorConfig,
    /// Extra decision boundaries. A row whose `(subsystem, action)` matches a
    /// seeded boundary replaces it.
    pub boundaries: Vec<BoundaryConfig>,
    pub logging: LoggingConfig,
}

// ── Governor ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Mission phase the governor starts in.
    pub initial_phase: MissionPhase,
    /// Load the built-in boundary table before applying `[[boundaries]]`.
    pub seed_defaults: bool,
    /// Start with emergency mode already active.
    pub emergency_mode: bool,
    /// Whether an operator is on console at startup.
    pub operator_present: bool,
    /// Maximum override records kept; the oldest are dropped first.
    pub max_override_history: usize,
    /// Pending actions whose deadline falls within this window count as urgent.
    pub urgent_window_secs: u64,
    /// Window used for the "recent overrides" status count.
    pub override_window_hours: u64,
    /// How often the background sweep expires stale actions. 0 disables it.
    pub expiry_sweep_interval_secs: u64,
    /// Restore boundary thresholds when leaving a critical mission phase.
    /// `false` keeps the tightened values for the rest of the process lifetime.
    pub restore_thresholds_on_phase_exit: bool,
    /// Capacity of the governor event bus.
    pub event_capacity: usize,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            initial_phase: MissionPhase::Cruise,
            seed_defaults: true,
            emergency_mode: false,
            operator_present: true,
            max_override_history: 1000,
            urgent_window_secs: 60,
            override_window_hours: 24,
            expiry_sweep_interval_secs: 5,
            restore_thresholds_on_phase_exit: true,
            event_capacity: 1024,
        }
    }
}

// ── Boundaries ─────────────────────────────────────────────────

/// A decision boundary as written in `odin.toml`:
///
/// ```toml
/// [[boundaries]]
/// id = "comms-beacon"
/// subsystem = "comms"
/// action = "enable_emergency_beacon"
/// autonomy_level = "full"
/// confidence_threshold = 90
/// time_constraint_secs = 15
/// safety_classification = "critical"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub id: String,
    pub subsystem: Subsystem,
    pub action: String,
    pub autonomy_level: AutonomyLevel,
    pub confidence_threshold: u8,
    pub time_constraint_secs: u64,
    #[serde(default)]
    pub requires_human_confirmation: bool,
    pub safety_classification: SafetyClassification,
    #[serde(default)]
    pub mission_phase_restrictions: Vec<MissionPhase>,
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
    /// Log file path (None = stdout only).
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
            file: None,
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "[{}] {}: {}", tag, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   hint: {}", h)?;
        }
        Ok(())
    }
}

impl OdinConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all error messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Governor ───
        if self.governor.max_override_history == 0 {
            warnings.push(ConfigWarning {
                field: "governor.max_override_history".into(),
                message: "override history is disabled, overrides will not be retained".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set to e.g. 1000".into()),
            });
        }
        if self.governor.urgent_window_secs == 0 {
            warnings.push(ConfigWarning {
                field: "governor.urgent_window_secs".into(),
                message: "urgent window is 0, no pending action will ever count as urgent".into(),
                severity: WarningSeverity::Warning,
                hint: Some("The usual window is 60 seconds".into()),
            });
        }
        if self.governor.event_capacity == 0 {
            warnings.push(ConfigWarning {
                field: "governor.event_capacity".into(),
                message: "event bus capacity must be greater than 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 1024".into()),
            });
        }
        if self.governor.expiry_sweep_interval_secs == 0 {
            warnings.push(ConfigWarning {
                field: "governor.expiry_sweep_interval_secs".into(),
                message: "expiry sweep disabled, stale actions stay pending".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }
        if !self.governor.seed_defaults && self.boundaries.is_empty() {
            warnings.push(ConfigWarning {
                field: "boundaries".into(),
                message: "no decision boundaries defined, every action will require manual control"
                    .into(),
                severity: WarningSeverity::Warning,
                hint: Some("Enable governor.seed_defaults or add [[boundaries]] rows".into()),
            });
        }

        // ── Boundaries ───
        let mut ids = HashSet::new();
        let mut pairs: HashMap<(Subsystem, &str), &str> = HashMap::new();
        for (i, b) in self.boundaries.iter().enumerate() {
            let field = format!("boundaries[{i}]");
            if b.id.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: format!("{field}.id"),
                    message: "boundary id is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            } else if !ids.insert(b.id.as_str()) {
                warnings.push(ConfigWarning {
                    field: format!("{field}.id"),
                    message: format!("duplicate boundary id '{}'", b.id),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
            if b.action.trim().is_empty() {
                warnings.push(ConfigWarning {
                    field: format!("{field}.action"),
                    message: "action is empty".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
            if b.confidence_threshold > 100 {
                warnings.push(ConfigWarning {
                    field: format!("{field}.confidence_threshold"),
                    message: format!("threshold {} is out of range", b.confidence_threshold),
                    severity: WarningSeverity::Error,
                    hint: Some("Confidence thresholds are percentages between 0 and 100".into()),
                });
            }
            if b.time_constraint_secs == 0 {
                warnings.push(ConfigWarning {
                    field: format!("{field}.time_constraint_secs"),
                    message: "time constraint is 0, no override window at all".into(),
                    severity: WarningSeverity::Error,
                    hint: None,
                });
            }
            if let Some(prev) = pairs.insert((b.subsystem, b.action.as_str()), b.id.as_str()) {
                warnings.push(ConfigWarning {
                    field: format!("{field}.action"),
                    message: format!(
                        "{}/{} is already governed by '{}', the later row wins",
                        b.subsystem, b.action, prev
                    ),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Logging ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors.join("\n"))
        }
    }
}
