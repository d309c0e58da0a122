//! Folds a finished workout into the user's cumulative stats.
//!
//! The calls run strictly in order: read stats, insert the workout record,
//! then update or insert the stats row. Each write is attempted regardless
//! of whether the previous one failed; failures are logged and reported in
//! the outcome, never retried or rolled back.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::user_stats::{
    StatsUpdate, UserStats, DEFAULT_FITNESS_TASKS_TOTAL, DEFAULT_WEEKLY_WORKOUT_GOAL,
};
use crate::models::workout::{NewWorkoutRecord, WorkoutRecord, STRENGTH_WORKOUT};
use crate::services::session::CompletedWorkout;
use crate::store::RecordStore;

#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub workout: Option<WorkoutRecord>,
    pub stats: Option<UserStats>,
    pub failures: Vec<&'static str>,
}

impl ReconcileOutcome {
    pub fn persisted(&self) -> bool {
        self.failures.is_empty()
    }
}

/// New values for the workout-driven stats fields. Missing stats count as
/// zero; a missing or non-positive goal falls back to the default.
pub fn compute_update(existing: Option<&UserStats>, estimated_calories: i32) -> StatsUpdate {
    let weekly_workout_completed = existing
        .map_or(0, |s| s.weekly_workout_completed)
        .saturating_add(1);
    let weekly_goal = positive_or(
        existing.map(|s| s.weekly_workout_goal),
        DEFAULT_WEEKLY_WORKOUT_GOAL,
    );
    let tasks_total = positive_or(
        existing.map(|s| s.fitness_tasks_total),
        DEFAULT_FITNESS_TASKS_TOTAL,
    );

    StatsUpdate {
        weekly_workout_completed,
        calories_burned: existing
            .map_or(0, |s| s.calories_burned)
            .saturating_add(estimated_calories),
        streak_days: existing.map_or(0, |s| s.streak_days).saturating_add(1),
        fitness_tasks_completed: existing
            .map_or(0, |s| s.fitness_tasks_completed)
            .saturating_add(1)
            .min(tasks_total),
        goal_progress: goal_progress(weekly_workout_completed, weekly_goal),
    }
}

fn positive_or(value: Option<i32>, default: i32) -> i32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

/// `completed / goal` as a whole percentage, clamped to 0..=100. A
/// non-positive goal means the default weekly goal.
pub fn goal_progress(completed: i32, goal: i32) -> i32 {
    let goal = positive_or(Some(goal), DEFAULT_WEEKLY_WORKOUT_GOAL);
    (completed.max(0) as i64 * 100 / goal as i64).min(100) as i32
}

pub fn workout_record(completed: &CompletedWorkout, finished_at: DateTime<Utc>) -> NewWorkoutRecord {
    NewWorkoutRecord {
        user_id: completed.user_id,
        name: format!("{} - {}", completed.routine_name, finished_at.date_naive()),
        workout_type: STRENGTH_WORKOUT.to_string(),
        duration_minutes: completed.duration_minutes(),
        calories_burned: completed.metrics.estimated_calories(),
        completed_at: finished_at,
        notes: format!(
            "Completed {} exercises with {} total sets",
            completed.exercise_count, completed.metrics.total_sets
        ),
    }
}

pub async fn reconcile(
    store: &dyn RecordStore,
    completed: &CompletedWorkout,
    finished_at: DateTime<Utc>,
) -> ReconcileOutcome {
    let user_id = completed.user_id;
    let mut outcome = ReconcileOutcome::default();

    let existing = match store.fetch_user_stats(user_id).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Error fetching user stats");
            None
        }
    };

    let estimated_calories = completed.metrics.estimated_calories();

    match store.insert_workout(&workout_record(completed, finished_at)).await {
        Ok(record) => outcome.workout = Some(record),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Error creating workout");
            outcome.failures.push("insert_workout");
        }
    }

    let update = compute_update(existing.as_ref(), estimated_calories);
    let written = match existing {
        Some(_) => store.update_user_stats(user_id, &update).await,
        None => store.insert_user_stats(&seeded_stats(user_id, &update)).await,
    };
    match written {
        Ok(stats) => outcome.stats = Some(stats),
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Error saving user stats");
            outcome.failures.push("save_user_stats");
        }
    }

    tracing::info!(
        user_id = %user_id,
        volume = completed.metrics.volume,
        sets = completed.metrics.total_sets,
        calories = estimated_calories,
        persisted = outcome.persisted(),
        "Workout reconciled"
    );

    outcome
}

fn seeded_stats(user_id: Uuid, update: &StatsUpdate) -> UserStats {
    let mut stats = UserStats::initial(user_id);
    stats.apply(update);
    stats
}
