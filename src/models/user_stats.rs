use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_CALORIES_GOAL: i32 = 2000;
pub const DEFAULT_WEEKLY_WORKOUT_GOAL: i32 = 5;
pub const DEFAULT_FITNESS_TASKS_TOTAL: i32 = 8;

/// Cumulative statistics row, one per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    pub id: Uuid,
    pub user_id: Uuid,
    pub steps_today: i32,
    pub calories_burned: i32,
    pub calories_goal: i32,
    pub calories_consumed: i32,
    pub goal_progress: i32,
    pub streak_days: i32,
    pub weekly_workout_completed: i32,
    pub weekly_workout_goal: i32,
    pub fitness_tasks_completed: i32,
    pub fitness_tasks_total: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Zeroed record with the default goals, as created on first access.
    pub fn initial(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            steps_today: 0,
            calories_burned: 0,
            calories_goal: DEFAULT_CALORIES_GOAL,
            calories_consumed: 0,
            goal_progress: 0,
            streak_days: 0,
            weekly_workout_completed: 0,
            weekly_workout_goal: DEFAULT_WEEKLY_WORKOUT_GOAL,
            fitness_tasks_completed: 0,
            fitness_tasks_total: DEFAULT_FITNESS_TASKS_TOTAL,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the workout-driven fields, leaving goals and daily counters.
    pub fn apply(&mut self, update: &StatsUpdate) {
        self.weekly_workout_completed = update.weekly_workout_completed;
        self.calories_burned = update.calories_burned;
        self.streak_days = update.streak_days;
        self.fitness_tasks_completed = update.fitness_tasks_completed;
        self.goal_progress = update.goal_progress;
        self.updated_at = Utc::now();
    }
}

/// The fields a finished workout rewrites on the stats row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsUpdate {
    pub weekly_workout_completed: i32,
    pub calories_burned: i32,
    pub streak_days: i32,
    pub fitness_tasks_completed: i32,
    pub goal_progress: i32,
}
