use axum::{
    extract::{Query, State},
    Extension, Json,
};

use crate::auth::middleware::AuthUser;
use crate::dto::NutritionQuery;
use crate::error::AppResult;
use crate::services::nutrition::{build_plan, NutritionPlan};
use crate::store::load_or_create_stats;
use crate::AppState;

const DEFAULT_HOURS_FASTED: f64 = 14.0;

pub async fn get_plan(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<NutritionQuery>,
) -> AppResult<Json<NutritionPlan>> {
    let stats = load_or_create_stats(state.store.as_ref(), auth_user.id).await?;
    Ok(Json(build_plan(
        stats.calories_goal,
        stats.calories_consumed,
        query.hours_fasted.unwrap_or(DEFAULT_HOURS_FASTED),
        state.config.fasting_target_hours,
    )))
}
