//! Credential repository trait (port)

use async_trait::async_trait;

use crate::domain::CredentialRecord;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DomainError>;
}
