//! # Secweb Core - Domain Module
//!
//! Principals, credential records, and request access rules.

pub mod access;
pub mod credential;
pub mod principal;

pub use access::{AccessPolicy, PathPattern, RequestClass, RouteRule, RouteTable};
pub use credential::CredentialRecord;
pub use principal::Principal;
