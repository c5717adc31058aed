// ============================================================================
// Secweb Core - Authentication Service
// File: crates/secweb-core/src/services/auth_service.rs
// ============================================================================
//! Credential verification against the seeded user directory

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, error, info, warn};

use secweb_security::password::PasswordService;

use crate::domain::Principal;
use crate::error::AuthError;
use crate::repositories::CredentialRepository;

/// Password every unknown username is checked against, so that a missing
/// user costs as much as a wrong password.
const TIMING_DUMMY_PASSWORD: &str = "secweb-timing-dummy";

pub struct AuthService {
    credentials: Arc<dyn CredentialRepository>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialRepository>) -> Self {
        Self {
            credentials,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Verify a username/password pair.
    ///
    /// Unknown user and wrong password both yield
    /// [`AuthError::InvalidCredentials`]. Hash comparison runs on the
    /// blocking pool and holds no shared lock.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        debug!("Login attempt for username: {}", username);

        let record = self
            .credentials
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("Credential lookup failed: {}", e);
                AuthError::Internal(e.to_string())
            })?;

        let Some(record) = record else {
            self.burn_dummy_verification(password).await?;
            warn!("Login failed for username: {}", username);
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = record.password_hash.clone();
        let candidate = password.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            PasswordService::verify(&candidate, &stored_hash)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))?;

        match verified {
            Ok(true) => {
                info!("Login successful for: {}", username);
                Ok(record.principal())
            }
            Ok(false) => {
                warn!("Login failed for username: {}", username);
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                error!("Stored hash for {} could not be verified: {}", username, e);
                Err(AuthError::Internal(e.to_string()))
            }
        }
    }

    async fn burn_dummy_verification(&self, password: &str) -> Result<(), AuthError> {
        let dummy_hash = self.dummy_hash.clone();
        let candidate = password.to_string();
        tokio::task::spawn_blocking(move || {
            let hash = dummy_hash.get_or_try_init(|| PasswordService::hash(TIMING_DUMMY_PASSWORD))?;
            PasswordService::verify(&candidate, hash).map(|_| ())
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))?
        .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CredentialRecord;
    use crate::error::DomainError;
    use crate::repositories::credential_repository::MockCredentialRepository;
    use mockall::predicate::eq;
    use secweb_shared::config::UserSeed;

    fn seeded_repo() -> MockCredentialRepository {
        let record =
            CredentialRecord::from_seed(&UserSeed::with_password("user", "user", &["USER"])).unwrap();
        let mut repo = MockCredentialRepository::new();
        repo.expect_find_by_username()
            .with(eq("user"))
            .returning(move |_| Ok(Some(record.clone())));
        repo.expect_find_by_username()
            .withf(|username| username != "user")
            .returning(|_| Ok(None));
        repo
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let service = AuthService::new(Arc::new(seeded_repo()));
        let principal = service.verify("user", "user").await.unwrap();
        assert_eq!(principal.username, "user");
        assert_eq!(principal.authorities(), vec!["ROLE_USER"]);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let service = AuthService::new(Arc::new(seeded_repo()));
        let wrong_password = service.verify("user", "invalidpassword").await;
        let unknown_user = service.verify("invalid", "invalidpassword").await;
        assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown_user, Err(AuthError::InvalidCredentials));
        assert!(service.dummy_hash.get().is_some());
    }

    #[tokio::test]
    async fn test_repository_failure_is_internal() {
        let mut repo = MockCredentialRepository::new();
        repo.expect_find_by_username()
            .returning(|_| Err(DomainError::RepositoryError("down".to_string())));
        let service = AuthService::new(Arc::new(repo));
        assert!(matches!(
            service.verify("user", "user").await,
            Err(AuthError::Internal(_))
        ));
    }
}
