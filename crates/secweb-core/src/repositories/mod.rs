//! Repository traits (ports)

pub mod credential_repository;

pub use credential_repository::CredentialRepository;
