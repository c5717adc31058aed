//! Session lifecycle on top of the session store

use std::sync::Arc;

use tracing::debug;

use secweb_security::session::{SessionError, SessionStore};
use secweb_shared::utils::fingerprint;

use crate::domain::Principal;
use crate::error::AuthError;

pub struct SessionService {
    store: Arc<SessionStore<Principal>>,
}

impl SessionService {
    pub fn new(store: Arc<SessionStore<Principal>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore<Principal>> {
        &self.store
    }

    /// Issues a fresh session. Any session presented with the login request
    /// is destroyed first, so a pre-login identifier never becomes
    /// authenticated.
    pub fn establish(&self, principal: Principal, previous: Option<&str>) -> String {
        if let Some(previous) = previous {
            if self.store.destroy(previous) {
                debug!("Replaced pre-login session {}", fingerprint(previous));
            }
        }
        self.store.create(principal)
    }

    pub fn resolve(&self, session_id: Option<&str>) -> Result<Principal, AuthError> {
        let session_id = session_id.ok_or(AuthError::NoSession)?;
        self.store.lookup(session_id).map_err(|e| match e {
            SessionError::NotFound => AuthError::NoSession,
            SessionError::Expired => AuthError::ExpiredSession,
        })
    }

    /// Idempotent; a missing or unknown session is not an error.
    pub fn invalidate(&self, session_id: Option<&str>) -> bool {
        session_id.is_some_and(|id| self.store.destroy(id))
    }
}
