//! # odin-cli
//!
//! Command-line interface for the ODIN autonomy governor.
//!
//! ## Commands
//!
//! - `odin boundaries`: List the decision boundary table
//! - `odin evaluate`: Evaluate a proposed action against the table
//! - `odin status`: Show the governor status summary
//! - `odin simulate`: Run a scripted mission pass and print governor events
//! - `odin config`: Show the effective configuration
//! - `odin completions`: Generate shell completions

pub mod commands;

pub use commands::Cli;
