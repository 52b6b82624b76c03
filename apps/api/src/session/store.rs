use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::models::{Session, TransitionError};

/// In-memory session storage. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner.write().await.insert(session.id, session.clone());
        debug!(session_id = %session.id, "Session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        self.inner
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| debug!(session_id = %id, "Session ended"))
            .ok_or_else(|| not_found(id))
    }

    /// Applies `f` to the stored session and stores its result.
    /// The write lock is held for the whole step, so transitions never interleave.
    pub async fn transition<F>(&self, id: Uuid, f: F) -> Result<Session, AppError>
    where
        F: FnOnce(Session) -> Result<Session, TransitionError>,
    {
        let mut sessions = self.inner.write().await;
        let current = sessions.get(&id).cloned().ok_or_else(|| not_found(id))?;
        let from = current.stage;
        let next = f(current)?;
        debug!(session_id = %id, ?from, to = ?next.stage, "Session transition");
        sessions.insert(id, next.clone());
        Ok(next)
    }

    /// Drops sessions whose last change is older than `max_idle`.
    /// Sessions with a request in flight are kept; the request settles them.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| {
            let idle = (now - s.updated_at).to_std().unwrap_or_default();
            s.stage.is_in_flight() || idle < max_idle
        });
        before - sessions.len()
    }

    /// Sweeps idle sessions every `every` until the runtime shuts down.
    pub fn spawn_eviction(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tick.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!(evicted, "Evicted idle sessions");
                }
            }
        })
    }

    #[cfg(test)]
    pub async fn insert(&self, session: Session) {
        self.inner.write().await.insert(session.id, session);
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
