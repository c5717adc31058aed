//! In-memory adapters

pub mod credential_repo_impl;

pub use credential_repo_impl::InMemoryCredentialRepository;
