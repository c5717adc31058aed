//! # Secweb Infrastructure
//!
//! Adapters implementing the core repository ports.

pub mod memory;
