//! In-memory record store for tests, with switchable failures and a log of
//! the calls it received.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::models::user_stats::{StatsUpdate, UserStats};
use crate::models::workout::{NewWorkoutRecord, WorkoutRecord};
use crate::store::{RecordStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    stats: HashMap<Uuid, UserStats>,
    workouts: Vec<WorkoutRecord>,
    calls: Vec<&'static str>,
    stats_inserts: usize,
    fail_stats_read: bool,
    fail_stats_write: bool,
    fail_workout_insert: bool,
}

#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats(stats: UserStats) -> Self {
        let store = Self::new();
        store.inner.lock().unwrap().stats.insert(stats.user_id, stats);
        store
    }

    pub fn fail_stats_read(&self, fail: bool) {
        self.inner.lock().unwrap().fail_stats_read = fail;
    }

    pub fn fail_stats_write(&self, fail: bool) {
        self.inner.lock().unwrap().fail_stats_write = fail;
    }

    pub fn fail_workout_insert(&self, fail: bool) {
        self.inner.lock().unwrap().fail_workout_insert = fail;
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn stats_inserts(&self) -> usize {
        self.inner.lock().unwrap().stats_inserts
    }

    pub fn stats_for(&self, user_id: Uuid) -> Option<UserStats> {
        self.inner.lock().unwrap().stats.get(&user_id).cloned()
    }

    pub fn workouts(&self) -> Vec<WorkoutRecord> {
        self.inner.lock().unwrap().workouts.clone()
    }
}

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} failed"))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch_user_stats(&self, user_id: Uuid) -> StoreResult<Option<UserStats>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("fetch_user_stats");
        if inner.fail_stats_read {
            return Err(unavailable("fetch_user_stats"));
        }
        Ok(inner.stats.get(&user_id).cloned())
    }

    async fn insert_user_stats(&self, stats: &UserStats) -> StoreResult<UserStats> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("insert_user_stats");
        if inner.fail_stats_write {
            return Err(unavailable("insert_user_stats"));
        }
        if inner.stats.contains_key(&stats.user_id) {
            return Err(StoreError::Unavailable("duplicate user_id".into()));
        }
        inner.stats_inserts += 1;
        inner.stats.insert(stats.user_id, stats.clone());
        Ok(stats.clone())
    }

    async fn update_user_stats(&self, user_id: Uuid, update: &StatsUpdate) -> StoreResult<UserStats> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("update_user_stats");
        if inner.fail_stats_write {
            return Err(unavailable("update_user_stats"));
        }
        let row = inner
            .stats
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::Database(sqlx::Error::RowNotFound))?;
        row.apply(update);
        Ok(row.clone())
    }

    async fn insert_workout(&self, record: &NewWorkoutRecord) -> StoreResult<WorkoutRecord> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("insert_workout");
        if inner.fail_workout_insert {
            return Err(unavailable("insert_workout"));
        }
        let row = WorkoutRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            name: record.name.clone(),
            workout_type: record.workout_type.clone(),
            duration_minutes: record.duration_minutes,
            calories_burned: record.calories_burned,
            completed: true,
            completed_at: Some(record.completed_at),
            notes: Some(record.notes.clone()),
            created_at: Utc::now(),
        };
        inner.workouts.push(row.clone());
        Ok(row)
    }

    async fn list_workouts(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<WorkoutRecord>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push("list_workouts");
        Ok(inner
            .workouts
            .iter()
            .rev()
            .filter(|w| w.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
