use chrono::{Duration, Utc};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ledger::Ledger;
use crate::services::session::{CompletedWorkout, SessionSnapshot, WorkoutSession};

/// Active workout sessions, owned by the server (single-instance deployments).
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, WorkoutSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, session: WorkoutSession) -> SessionSnapshot {
        let snapshot = session.snapshot();
        self.sessions.lock().await.insert(session.id, session);
        snapshot
    }

    pub async fn snapshot(&self, user_id: Uuid, session_id: Uuid) -> AppResult<SessionSnapshot> {
        let sessions = self.sessions.lock().await;
        let session = owned(sessions.get(&session_id), user_id)?;
        Ok(session.snapshot())
    }

    /// Apply a ledger mutation and return the resulting snapshot.
    pub async fn edit<R>(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        op: impl FnOnce(&mut Ledger) -> R,
    ) -> AppResult<(R, SessionSnapshot)> {
        let mut sessions = self.sessions.lock().await;
        let session = owned_mut(sessions.get_mut(&session_id), user_id)?;
        let out = op(session.ledger_mut()?);
        Ok((out, session.snapshot()))
    }

    /// Move the session to Finished and take it out of the registry.
    pub async fn finish(&self, user_id: Uuid, session_id: Uuid) -> AppResult<(CompletedWorkout, SessionSnapshot)> {
        let mut sessions = self.sessions.lock().await;
        let session = owned_mut(sessions.get_mut(&session_id), user_id)?;
        let completed = session.finish()?;
        let snapshot = session.snapshot();
        sessions.remove(&session_id);
        Ok((completed, snapshot))
    }

    pub async fn discard(&self, user_id: Uuid, session_id: Uuid) -> AppResult<SessionSnapshot> {
        let mut sessions = self.sessions.lock().await;
        let session = owned_mut(sessions.get_mut(&session_id), user_id)?;
        session.discard()?;
        let snapshot = session.snapshot();
        sessions.remove(&session_id);
        Ok(snapshot)
    }

    pub async fn tick_all(&self) {
        let mut sessions = self.sessions.lock().await;
        for session in sessions.values_mut() {
            session.tick();
        }
    }

    /// Drop sessions started more than `max_age_secs` ago. Nothing is persisted
    /// for them.
    pub async fn purge_older_than(&self, max_age_secs: i64) -> usize {
        let cutoff = Utc::now() - Duration::seconds(max_age_secs);
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.started_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

fn owned(session: Option<&WorkoutSession>, user_id: Uuid) -> AppResult<&WorkoutSession> {
    session
        .filter(|s| s.user_id == user_id)
        .ok_or(AppError::NotFound("Workout session not found".into()))
}

fn owned_mut(session: Option<&mut WorkoutSession>, user_id: Uuid) -> AppResult<&mut WorkoutSession> {
    session
        .filter(|s| s.user_id == user_id)
        .ok_or(AppError::NotFound("Workout session not found".into()))
}

// ── Session Ticker ───────────────────────────────────────────────────────────

pub fn spawn_session_ticker(registry: SessionRegistry, max_age_secs: i64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        let mut ticks: u64 = 0;
        loop {
            interval.tick().await;
            registry.tick_all().await;

            ticks += 1;
            if ticks % 60 == 0 {
                let purged = registry.purge_older_than(max_age_secs).await;
                if purged > 0 {
                    tracing::info!(purged = purged, "Session ticker: dropped abandoned workouts");
                }
            }
        }
    });
}
