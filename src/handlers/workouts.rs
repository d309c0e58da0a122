use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::workout::{WorkoutHistoryQuery, WorkoutRecord};
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<WorkoutHistoryQuery>,
) -> AppResult<Json<Vec<WorkoutRecord>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let workouts = state.store.list_workouts(auth_user.id, limit).await?;
    Ok(Json(workouts))
}
