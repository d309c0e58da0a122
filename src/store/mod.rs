//! Record store: the persistence seam for stats and workout history.
//!
//! Handlers and the reconciler only see [`RecordStore`]; the Postgres
//! implementation also publishes every successful write on the
//! [`ChangeFeed`](feed::ChangeFeed) so WebSocket clients see it live.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user_stats::{StatsUpdate, UserStats};
use crate::models::workout::{NewWorkoutRecord, WorkoutRecord};

pub mod feed;
#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// `Ok(None)` when the user has no stats row yet.
    async fn fetch_user_stats(&self, user_id: Uuid) -> StoreResult<Option<UserStats>>;

    async fn insert_user_stats(&self, stats: &UserStats) -> StoreResult<UserStats>;

    async fn update_user_stats(&self, user_id: Uuid, update: &StatsUpdate) -> StoreResult<UserStats>;

    async fn insert_workout(&self, record: &NewWorkoutRecord) -> StoreResult<WorkoutRecord>;

    /// Newest first.
    async fn list_workouts(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<WorkoutRecord>>;
}

/// Fetch the user's stats, creating the default row on first access. A lost
/// insert race falls back to re-reading the row the other writer created.
pub async fn load_or_create_stats(store: &dyn RecordStore, user_id: Uuid) -> StoreResult<UserStats> {
    if let Some(stats) = store.fetch_user_stats(user_id).await? {
        return Ok(stats);
    }

    match store.insert_user_stats(&UserStats::initial(user_id)).await {
        Ok(stats) => Ok(stats),
        Err(insert_err) => {
            tracing::warn!(user_id = %user_id, error = %insert_err, "Initial stats insert failed, re-reading");
            store.fetch_user_stats(user_id).await?.ok_or(insert_err)
        }
    }
}
