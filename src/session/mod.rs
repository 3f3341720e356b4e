//! Per-user session state.
//!
//! A session holds the last fetched batch and its ranked set. Each successful
//! fetch overwrites both; nothing else clears them. Sessions that stay idle past
//! the configured window are evicted.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::paper::{FetchedBatch, RankedSet};

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "paperlens_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a cookie value; anything but a UUID is rejected.
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub batch: Option<FetchedBatch>,
    pub ranked: Option<RankedSet>,
}

impl SessionContext {
    /// Replaces the stored batch and ranked set.
    pub fn store(&mut self, batch: FetchedBatch, ranked: RankedSet) {
        self.batch = Some(batch);
        self.ranked = Some(ranked);
    }

    pub fn ranked(&self) -> Option<&RankedSet> {
        self.ranked.as_ref()
    }
}

pub type SharedSession = Arc<RwLock<SessionContext>>;

/// A session looked up (or started) for one request.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: SessionId,
    pub context: SharedSession,
    /// `true` if the request carried no usable session and a new one was started.
    pub created: bool,
}

/// In-memory session registry with idle expiry.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<SessionId, SharedSession>,
    idle: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.sessions.entry_count())
            .field("idle", &self.idle)
            .finish()
    }
}

impl SessionStore {
    pub fn new(idle: Duration, max_sessions: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
            idle,
        }
    }

    /// Looks up the session named by `cookie`, or starts an empty one.
    pub fn resolve(&self, cookie: Option<&str>) -> ResolvedSession {
        if let Some(id) = cookie.and_then(SessionId::parse)
            && let Some(context) = self.sessions.get(&id)
        {
            return ResolvedSession {
                id,
                context,
                created: false,
            };
        }

        let id = SessionId::new();
        let context = SharedSession::default();
        self.sessions.insert(id, Arc::clone(&context));
        debug!(session = %id, "Started session");

        ResolvedSession {
            id,
            context,
            created: true,
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions.get(id)
    }

    pub fn remove(&self, id: &SessionId) {
        self.sessions.invalidate(id);
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Approximate number of live sessions.
    pub fn len(&self) -> u64 {
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies pending inserts and evictions (mostly for tests).
    pub fn run_pending_tasks(&self) {
        self.sessions.run_pending_tasks();
    }
}
