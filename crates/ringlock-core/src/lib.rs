//! Shared types for the Ringlock door access-control engine.
//!
//! This crate holds the data model used across the workspace: duration
//! classes and their acceptance windows, the validated ring-code sequence,
//! lock state enums, and the constants that fix the observable unlock
//! protocol (lockout window, relock settle delay, audio gain ladder).

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
