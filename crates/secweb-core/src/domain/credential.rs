//! Seeded credential record

use std::collections::BTreeSet;
use std::fmt;

use secweb_security::password::PasswordService;
use secweb_shared::config::UserSeed;
use secweb_shared::constants::ROLE_PREFIX;

use crate::domain::Principal;
use crate::error::ConfigurationError;

/// Immutable for the process lifetime.
#[derive(Clone)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub roles: BTreeSet<String>,
}

impl CredentialRecord {
    /// Builds a record from a config seed, hashing a plain `password` with
    /// Argon2id or validating a supplied `password_hash`.
    pub fn from_seed(seed: &UserSeed) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidCredentialSeed {
            username: seed.username.clone(),
            reason,
        };

        if seed.username.trim().is_empty() {
            return Err(invalid("username is blank".to_string()));
        }

        let password_hash = match (&seed.password, &seed.password_hash) {
            (Some(_), Some(_)) => {
                return Err(invalid("set either password or password_hash, not both".to_string()))
            }
            (None, None) => return Err(invalid("password or password_hash is required".to_string())),
            (Some(plain), None) => {
                PasswordService::hash(plain).map_err(|e| invalid(e.to_string()))?
            }
            (None, Some(hash)) => {
                PasswordService::validate_stored(hash).map_err(|e| invalid(e.to_string()))?;
                hash.clone()
            }
        };

        let mut roles = BTreeSet::new();
        for role in &seed.roles {
            if role.trim().is_empty() {
                return Err(invalid("blank role".to_string()));
            }
            if role.starts_with(ROLE_PREFIX) {
                return Err(invalid(format!(
                    "role {} must not start with {} (it is added automatically)",
                    role, ROLE_PREFIX
                )));
            }
            roles.insert(role.clone());
        }
        if roles.is_empty() {
            return Err(invalid("at least one role is required".to_string()));
        }

        Ok(Self {
            username: seed.username.clone(),
            password_hash,
            roles,
        })
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.roles.iter().cloned())
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("password_hash", &"[redacted]")
            .field("roles", &self.roles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY_USER_HASH: &str =
        "{bcrypt}$2a$10$iJAaEIeg9PGshTJhFAQb5efHOJ3/lhroe/Ndq8DkYhUfcObb19nIO";

    #[test]
    fn test_plain_password_is_hashed() {
        let record = CredentialRecord::from_seed(&UserSeed::with_password("user", "user", &["USER"]))
            .unwrap();
        assert!(record.password_hash.starts_with("{argon2}"));
        assert!(!record.password_hash.contains("user"));
        assert_eq!(record.principal(), Principal::new("user", ["USER"]));
    }

    #[test]
    fn test_supplied_hash_is_kept() {
        let record =
            CredentialRecord::from_seed(&UserSeed::with_hash("user", LEGACY_USER_HASH, &["USER"]))
                .unwrap();
        assert_eq!(record.password_hash, LEGACY_USER_HASH);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let err = CredentialRecord::from_seed(&UserSeed::with_hash("user", "{md5}abc", &["USER"]))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidCredentialSeed { .. }));
    }

    #[test]
    fn test_seed_needs_exactly_one_secret() {
        let mut seed = UserSeed::with_password("user", "user", &["USER"]);
        seed.password_hash = Some(LEGACY_USER_HASH.to_string());
        assert!(CredentialRecord::from_seed(&seed).is_err());

        seed.password = None;
        seed.password_hash = None;
        assert!(CredentialRecord::from_seed(&seed).is_err());
    }

    #[test]
    fn test_prefixed_role_rejected() {
        let seed = UserSeed::with_hash("user", LEGACY_USER_HASH, &["ROLE_USER"]);
        assert!(CredentialRecord::from_seed(&seed).is_err());
    }

    #[test]
    fn test_debug_redacts_hash() {
        let record =
            CredentialRecord::from_seed(&UserSeed::with_hash("user", LEGACY_USER_HASH, &["USER"]))
                .unwrap();
        assert!(!format!("{:?}", record).contains("$2a$"));
    }
}
