//! # Secweb Core
//!
//! Domain types, the route table, repository ports, and the authentication
//! and session services.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{AuthError, ConfigurationError, DomainError};
