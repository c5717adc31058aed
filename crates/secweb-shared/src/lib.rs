//! # Secweb Shared
//!
//! Configuration, telemetry, and constants shared by every secweb crate.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use error::AppError;
