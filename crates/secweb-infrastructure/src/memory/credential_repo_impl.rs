// ============================================================================
// Secweb Infrastructure - In-memory Credential Repository
// File: crates/secweb-infrastructure/src/memory/credential_repo_impl.rs
// ============================================================================
//! Immutable user directory built once from configuration seeds

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use secweb_core::domain::CredentialRecord;
use secweb_core::error::{ConfigurationError, DomainError};
use secweb_core::repositories::CredentialRepository;
use secweb_shared::config::UserSeed;

#[derive(Debug)]
pub struct InMemoryCredentialRepository {
    users: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentialRepository {
    /// Fails when no seed is given or a username repeats.
    pub fn from_seeds(seeds: &[UserSeed]) -> Result<Self, ConfigurationError> {
        if seeds.is_empty() {
            return Err(ConfigurationError::MissingCredentialSeed);
        }

        let mut users = HashMap::with_capacity(seeds.len());
        for seed in seeds {
            if users.contains_key(&seed.username) {
                return Err(ConfigurationError::DuplicateUsername(seed.username.clone()));
            }
            let record = CredentialRecord::from_seed(seed)?;
            users.insert(record.username.clone(), record);
        }

        info!("Credential store loaded with {} user(s)", users.len());
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DomainError> {
        Ok(self.users.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_USER_HASH: &str =
        "{bcrypt}$2a$10$iJAaEIeg9PGshTJhFAQb5efHOJ3/lhroe/Ndq8DkYhUfcObb19nIO";

    #[tokio::test]
    async fn test_lookup_seeded_user() {
        let repo =
            InMemoryCredentialRepository::from_seeds(&[UserSeed::with_hash("user", LEGACY_USER_HASH, &["USER"])])
                .unwrap();
        assert_eq!(repo.len(), 1);
        let record = repo.find_by_username("user").await.unwrap().unwrap();
        assert_eq!(record.username, "user");
        assert!(repo.find_by_username("invalid").await.unwrap().is_none());
    }

    #[test]
    fn test_missing_seed_is_fatal() {
        assert_eq!(
            InMemoryCredentialRepository::from_seeds(&[]).unwrap_err(),
            ConfigurationError::MissingCredentialSeed
        );
    }

    #[test]
    fn test_duplicate_username_is_fatal() {
        let seeds = [
            UserSeed::with_hash("user", LEGACY_USER_HASH, &["USER"]),
            UserSeed::with_hash("user", LEGACY_USER_HASH, &["ADMIN"]),
        ];
        assert_eq!(
            InMemoryCredentialRepository::from_seeds(&seeds).unwrap_err(),
            ConfigurationError::DuplicateUsername("user".to_string())
        );
    }
}
