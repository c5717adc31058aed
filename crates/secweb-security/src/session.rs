//! Server-side session storage
//!
//! Sessions live in a sharded concurrent map keyed by a 256-bit random
//! identifier. Entries expire after an idle period; expired entries are
//! dropped on lookup and by the periodic reaper.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::RngCore;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use secweb_shared::utils::fingerprint;

const SESSION_ID_BYTES: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Session expired")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct Session<P> {
    pub id: String,
    pub principal: P,
    pub created_at: DateTime<Utc>,
    last_accessed: Instant,
}

impl<P> Session<P> {
    fn new(id: String, principal: P) -> Self {
        Self {
            id,
            principal,
            created_at: Utc::now(),
            last_accessed: Instant::now(),
        }
    }

    pub fn is_expired(&self, idle_timeout: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_accessed) > idle_timeout
    }
}

/// Concurrent session map, generic over the principal it resolves to.
pub struct SessionStore<P> {
    sessions: DashMap<String, Session<P>>,
    idle_timeout: Duration,
}

impl<P: Clone + Send + Sync + 'static> SessionStore<P> {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Stores a new session and returns its identifier.
    pub fn create(&self, principal: P) -> String {
        loop {
            let id = generate_session_id();
            match self.sessions.entry(id) {
                Entry::Occupied(_) => {
                    debug!("Session id collision, regenerating");
                    continue;
                }
                Entry::Vacant(slot) => {
                    let id = slot.key().clone();
                    slot.insert(Session::new(id.clone(), principal));
                    debug!("Session created: {}", fingerprint(&id));
                    return id;
                }
            }
        }
    }

    /// Resolves a session, refreshing its idle timer.
    pub fn lookup(&self, id: &str) -> Result<P, SessionError> {
        let now = Instant::now();
        {
            let mut entry = self.sessions.get_mut(id).ok_or(SessionError::NotFound)?;
            if !entry.is_expired(self.idle_timeout, now) {
                entry.last_accessed = now;
                return Ok(entry.principal.clone());
            }
        }
        // Guard dropped above; removing while holding it would deadlock the shard.
        self.sessions
            .remove_if(id, |_, s| s.is_expired(self.idle_timeout, now));
        debug!("Session expired: {}", fingerprint(id));
        Err(SessionError::Expired)
    }

    /// Removes a session. Returns whether one existed.
    pub fn destroy(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            debug!("Session destroyed: {}", fingerprint(id));
        }
        removed
    }

    /// Drops every idle-expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, s| !s.is_expired(self.idle_timeout, now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns the background task that purges expired sessions.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    info!("Session reaper purged {} expired sessions", purged);
                }
            }
        })
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
