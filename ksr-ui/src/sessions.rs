//! Live session registry
//!
//! Every session sits behind its own mutex: events for one customer are
//! applied strictly one after another while other sessions proceed.
//!
//! Clients are expected to reuse a session across customers via `reset`.
//! Sessions that finish and are then left alone are evicted the next time a
//! session is opened, once they have been idle for the registry's timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ksr_common::{Phase, SessionState};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// How long a finished session may sit untouched before it is evicted
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// One customer session and when it last changed
#[derive(Debug, Clone)]
pub struct LiveSession {
    state: SessionState,
    last_event: Instant,
}

impl LiveSession {
    fn new() -> Self {
        Self {
            state: SessionState::new(),
            last_event: Instant::now(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Replace the state after a successful event
    pub fn advance(&mut self, next: SessionState) {
        self.state = next;
        self.last_event = Instant::now();
    }

    fn is_stale(&self, idle_timeout: Duration) -> bool {
        self.state.phase() == Phase::Done && self.last_event.elapsed() >= idle_timeout
    }
}

/// Shared handle to one session
pub type SessionSlot = Arc<Mutex<LiveSession>>;

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout,
        }
    }

    /// Open a fresh session awaiting a rating
    pub async fn create(&self) -> (Uuid, SessionState) {
        let id = Uuid::new_v4();
        let session = LiveSession::new();
        let state = session.state.clone();

        let mut sessions = self.sessions.write().await;
        self.evict_stale(&mut sessions);
        sessions.insert(id, Arc::new(Mutex::new(session)));
        (id, state)
    }

    /// Drop finished sessions idle past the timeout. Slots locked by an
    /// in-flight request are left alone.
    fn evict_stale(&self, sessions: &mut HashMap<Uuid, SessionSlot>) {
        let before = sessions.len();
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => !session.is_stale(self.idle_timeout),
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle finished sessions");
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionSlot> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session; false if it did not exist
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
