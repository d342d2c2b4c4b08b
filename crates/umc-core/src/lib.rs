//! # UMC Core
//!
//! Domain models, form schemas and route guards for the user management
//! console.

pub mod domain;
pub mod forms;
pub mod access;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
pub use forms::FormErrors;
