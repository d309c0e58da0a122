use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::user_stats::UserStats;
use crate::services::dashboard::{build_dashboard, Dashboard};
use crate::store::load_or_create_stats;
use crate::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<UserStats>> {
    let stats = load_or_create_stats(state.store.as_ref(), auth_user.id).await?;
    Ok(Json(stats))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Dashboard>> {
    let stats = load_or_create_stats(state.store.as_ref(), auth_user.id).await?;
    Ok(Json(build_dashboard(stats)))
}
