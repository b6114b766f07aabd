//! # odin-core
//!
//! Core types, events, and primitives for the ODIN autonomy governor.
//! This crate defines the shared vocabulary used by every other crate in the workspace.

pub mod error;
pub mod event;
pub mod types;

pub use error::{OdinError, Result};
pub use event::{Event, EventBus};
pub use types::*;
