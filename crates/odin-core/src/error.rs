use thiserror::Error;

/// Unified error type for the ODIN governor and its tooling.
///
/// Governor lookups never produce these: an unknown boundary or a stale
/// override is reported as `None` / `false`. Errors are reserved for setup
/// paths (configuration, boundary validation, CLI I/O).
#[derive(Error, Debug)]
pub enum OdinError {
    // ── Policy errors ──────────────────────────────────────────
    #[error("invalid decision boundary {id}: {reason}")]
    InvalidBoundary { id: String, reason: String },

    #[error("unknown subsystem: {0}")]
    UnknownSubsystem(String),

    #[error("unknown mission phase: {0}")]
    UnknownMissionPhase(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OdinError>;
