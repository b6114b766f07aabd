//! # odin-config
//!
//! Configuration system for the ODIN governor. Reads from `odin.toml` and
//! environment variables, in that precedence order (env wins).

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::OdinConfig;
pub use schema::{BoundaryConfig, ConfigWarning, GovernorConfig, LoggingConfig, WarningSeverity};
