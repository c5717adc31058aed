//! Domain errors

use thiserror::Error;

/// Authentication outcomes that are turned into HTTP responses, never
/// propagated to a generic error handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No session")]
    NoSession,

    #[error("Session expired")]
    ExpiredSession,

    #[error("Authentication unavailable: {0}")]
    Internal(String),
}

/// Startup-time misconfiguration. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Route table is empty")]
    EmptyRouteTable,

    #[error("Invalid route pattern {pattern:?}: {reason}")]
    InvalidRoutePattern { pattern: String, reason: String },

    #[error("Unknown access policy {access:?} for pattern {pattern:?}")]
    UnknownAccessPolicy { pattern: String, access: String },

    #[error("Route {pattern:?} is unreachable after catch-all {catch_all:?}")]
    UnreachableRoute { pattern: String, catch_all: String },

    #[error("No credentials seeded")]
    MissingCredentialSeed,

    #[error("Duplicate username: {0}")]
    DuplicateUsername(String),

    #[error("Invalid credential seed for {username}: {reason}")]
    InvalidCredentialSeed { username: String, reason: String },

    #[error("Invalid security setting {key}: {reason}")]
    InvalidSetting { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    RepositoryError(String),
}
