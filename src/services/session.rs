use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::services::ledger::{ExerciseLog, Ledger, RoutineExercise};
use crate::services::metrics::{compute_metrics, SessionMetrics};
use crate::services::timer::{format_time, SessionTimer};

pub const DEFAULT_ROUTINE_NAME: &str = "Workout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Finished,
    Discarded,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Workout session is no longer active")]
    NotActive,
}

/// A workout being logged. Finished and Discarded are terminal.
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub routine_name: String,
    pub started_at: DateTime<Utc>,
    ledger: Ledger,
    timer: SessionTimer,
    state: SessionState,
}

/// What a finished session hands to the stats reconciler.
#[derive(Debug, Clone)]
pub struct CompletedWorkout {
    pub user_id: Uuid,
    pub routine_name: String,
    pub elapsed_secs: u64,
    pub metrics: SessionMetrics,
    pub exercise_count: usize,
}

impl CompletedWorkout {
    pub fn duration_minutes(&self) -> i32 {
        (self.elapsed_secs / 60).min(i32::MAX as u64) as i32
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub routine_name: String,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
    pub elapsed: String,
    pub volume: u64,
    pub total_sets: u32,
    pub exercises: Vec<ExerciseLog>,
}

impl WorkoutSession {
    pub fn start(user_id: Uuid, routine_name: Option<&str>, routine: &[RoutineExercise]) -> Self {
        let routine_name = routine_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ROUTINE_NAME)
            .to_string();

        Self {
            id: Uuid::new_v4(),
            user_id,
            routine_name,
            started_at: Utc::now(),
            ledger: Ledger::from_routine(routine),
            timer: SessionTimer::started(),
            state: SessionState::Active,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Mutable access to the ledger, only while the session is active.
    pub fn ledger_mut(&mut self) -> Result<&mut Ledger, SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        Ok(&mut self.ledger)
    }

    pub fn tick(&mut self) {
        self.timer.tick();
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    pub fn metrics(&self) -> SessionMetrics {
        compute_metrics(&self.ledger)
    }

    pub fn finish(&mut self) -> Result<CompletedWorkout, SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        self.timer.stop();
        self.state = SessionState::Finished;

        Ok(CompletedWorkout {
            user_id: self.user_id,
            routine_name: self.routine_name.clone(),
            elapsed_secs: self.timer.elapsed_secs(),
            metrics: self.metrics(),
            exercise_count: self.ledger.exercises().len(),
        })
    }

    pub fn discard(&mut self) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        self.timer.stop();
        self.state = SessionState::Discarded;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let metrics = self.metrics();
        SessionSnapshot {
            id: self.id,
            routine_name: self.routine_name.clone(),
            state: self.state(),
            started_at: self.started_at,
            elapsed_secs: self.timer.elapsed_secs(),
            elapsed: format_time(self.timer.elapsed_secs()),
            volume: metrics.volume,
            total_sets: metrics.total_sets,
            exercises: self.ledger.exercises().to_vec(),
        }
    }
}
