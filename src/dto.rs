//! # FitTrack: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Request validation uses `validator` derive macros where rules exist

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user_stats::UserStats;
use crate::models::workout::WorkoutRecord;
use crate::services::ledger::{RoutineExercise, SetField};
use crate::services::session::SessionSnapshot;
use crate::services::timer::format_time;

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// Transient toast the client shows after an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    fn new(title: &str, description: impl Into<String>, variant: NotificationVariant) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            variant,
        }
    }

    pub fn workout_completed(elapsed_secs: u64, volume: u64, sets: u32) -> Self {
        Self::new(
            "Workout completed!",
            format!(
                "Great job! Duration: {}, Volume: {}kg, Sets: {}",
                format_time(elapsed_secs),
                volume,
                sets
            ),
            NotificationVariant::Default,
        )
    }

    pub fn save_failed() -> Self {
        Self::new("Error", "Failed to save workout data", NotificationVariant::Destructive)
    }

    pub fn workout_discarded() -> Self {
        Self::new(
            "Workout discarded",
            "Your workout has been discarded",
            NotificationVariant::Default,
        )
    }

    pub fn signed_out() -> Self {
        Self::new("Signed out", "You have been signed out", NotificationVariant::Default)
    }

    pub fn sign_out_failed() -> Self {
        Self::new("Error", "Failed to sign out", NotificationVariant::Destructive)
    }
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub signed_out: bool,
    pub notification: Notification,
}

// ============================================================================
// Workout sessions
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RoutineRef {
    pub id: Option<Uuid>,
    pub name: Option<String>,
}

/// POST /api/sessions
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub routine: RoutineRef,
    #[serde(default)]
    pub exercises: Vec<RoutineExercise>,
}

/// POST /api/sessions/:id/exercises
#[derive(Debug, Default, Deserialize)]
pub struct AddExerciseRequest {
    pub name: Option<String>,
}

/// PUT /api/sessions/:id/exercises/:exercise_id/sets/:set_id
///
/// `value` is taken as-is and coerced; anything unusable becomes zero.
#[derive(Debug, Deserialize)]
pub struct UpdateSetRequest {
    pub field: SetField,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// PUT /api/sessions/:id/exercises/:exercise_id/notes
#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: SessionSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub session: SessionSnapshot,
    pub persisted: bool,
    pub workout: Option<WorkoutRecord>,
    pub stats: Option<UserStats>,
    pub notification: Notification,
}

#[derive(Debug, Serialize)]
pub struct DiscardResponse {
    pub session: SessionSnapshot,
    pub notification: Notification,
}

// ============================================================================
// Nutrition
// ============================================================================

/// GET /api/nutrition/plan
#[derive(Debug, Deserialize)]
pub struct NutritionQuery {
    pub hours_fasted: Option<f64>,
}
