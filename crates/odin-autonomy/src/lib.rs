//! # odin-autonomy
//!
//! The autonomy governor. Maps a proposed spacecraft action and its confidence
//! score to an allow / advisory / manual verdict using a table of decision
//! boundaries, tracks pending actions until they are executed, overridden, or
//! expire, and keeps a bounded history of human overrides. Emergency mode
//! forces manual control of everything but safety-critical actions.

pub mod action;
pub mod boundary;
pub mod clock;
pub mod governor;
pub mod level;
pub mod shared;
pub mod verdict;

pub use action::{AutonomousAction, HumanOverride};
pub use boundary::{DecisionBoundary, default_boundaries};
pub use clock::{Clock, ManualClock, SystemClock};
pub use governor::{AutonomyGovernor, AutonomyStatus, EMERGENCY_OPERATOR_ID, GovernorSettings};
pub use level::ConfidenceTier;
pub use shared::SharedGovernor;
pub use verdict::{Denial, HealthStatus, SystemHealthSummary, Verdict};
