use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::controller::WidgetSession;
use crate::observability::set_active_sessions;

/// Mounted widget sessions keyed by id, with idle expiry.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<WidgetSession>>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionRegistry {
    /// Create a new registry. Must be called inside a tokio runtime: it starts
    /// the background cleanup task, which stops once the registry is dropped.
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        let registry = Self {
            sessions: Arc::new(DashMap::new()),
            ttl,
            max_sessions,
        };

        let weak: Weak<DashMap<Uuid, Arc<WidgetSession>>> = Arc::downgrade(&registry.sessions);
        let sweep_every = ttl.min(Duration::from_secs(60)).max(Duration::from_millis(10));
        tokio::spawn(async move {
            let mut cleanup_interval = interval(sweep_every);
            loop {
                cleanup_interval.tick().await;
                let Some(sessions) = weak.upgrade() else {
                    break;
                };
                Self::cleanup_expired_sessions(&sessions, ttl);
            }
        });

        info!("🔄 SessionRegistry initialized with TTL: {:?}, max_sessions: {}", ttl, max_sessions);
        registry
    }

    pub fn insert(&self, session: Arc<WidgetSession>) {
        if self.sessions.len() >= self.max_sessions {
            warn!("🚫 Session registry full ({} sessions), forcing cleanup", self.sessions.len());
            Self::cleanup_expired_sessions(&self.sessions, self.ttl);
            if self.sessions.len() >= self.max_sessions {
                self.evict_least_recent();
            }
        }

        self.sessions.insert(session.id(), session);
        set_active_sessions(self.sessions.len());
    }

    /// Looks up a live session and refreshes its idle timer.
    pub fn get(&self, id: &Uuid) -> Option<Arc<WidgetSession>> {
        let session = self.sessions.get(id).map(|entry| entry.value().clone())?;
        if session.idle_for() >= self.ttl {
            self.remove(id);
            return None;
        }
        session.touch();
        Some(session)
    }

    /// Removes and unmounts a session.
    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id);
        set_active_sessions(self.sessions.len());
        match removed {
            Some((_, session)) => {
                session.unmount();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn force_cleanup(&self) {
        Self::cleanup_expired_sessions(&self.sessions, self.ttl);
    }

    fn evict_least_recent(&self) {
        let oldest = self
            .sessions
            .iter()
            .max_by_key(|entry| entry.value().idle_for())
            .map(|entry| *entry.key());

        if let Some(id) = oldest {
            debug!(session = %id, "evicting least recently used session");
            self.remove(&id);
        }
    }

    fn cleanup_expired_sessions(sessions: &DashMap<Uuid, Arc<WidgetSession>>, ttl: Duration) {
        let initial_size = sessions.len();

        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|entry| entry.value().idle_for() >= ttl)
            .map(|entry| *entry.key())
            .collect();

        for id in &expired {
            if let Some((_, session)) = sessions.remove(id) {
                session.unmount();
            }
        }

        if !expired.is_empty() {
            set_active_sessions(sessions.len());
            info!(
                "🧹 Cleaned up {} expired widget sessions (registry: {} -> {})",
                expired.len(),
                initial_size,
                sessions.len()
            );
        }
    }
}
