//! # UMC Shared
//!
//! Shared configuration, telemetry, constants and small helpers for the
//! user management console crates.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
