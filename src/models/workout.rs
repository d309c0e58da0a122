use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STRENGTH_WORKOUT: &str = "strength";

/// Append-only snapshot of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub workout_type: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkoutRecord {
    pub user_id: Uuid,
    pub name: String,
    pub workout_type: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub completed_at: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutHistoryQuery {
    pub limit: Option<i64>,
}
