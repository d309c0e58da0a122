use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::{
    AddExerciseRequest, DiscardResponse, FinishResponse, Notification, SessionResponse,
    StartSessionRequest, UpdateNotesRequest, UpdateSetRequest,
};
use crate::error::AppResult;
use crate::services::reconciler::reconcile;
use crate::services::session::{SessionSnapshot, WorkoutSession};
use crate::AppState;

fn snapshot_only(session: SessionSnapshot) -> Json<SessionResponse> {
    Json(SessionResponse {
        session,
        created_id: None,
    })
}

pub async fn start_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<StartSessionRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = WorkoutSession::start(auth_user.id, body.routine.name.as_deref(), &body.exercises);

    tracing::info!(
        user_id = %auth_user.id,
        session_id = %session.id,
        routine_id = ?body.routine.id,
        exercises = session.ledger().exercises().len(),
        "Workout session started"
    );

    let snapshot = state.sessions.insert(session).await;
    Ok(snapshot_only(snapshot))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let snapshot = state.sessions.snapshot(auth_user.id, session_id).await?;
    Ok(snapshot_only(snapshot))
}

pub async fn add_exercise(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    body: Option<Json<AddExerciseRequest>>,
) -> AppResult<Json<SessionResponse>> {
    let name = body.and_then(|Json(b)| b.name);
    let (id, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| ledger.add_exercise(name.as_deref()))
        .await?;
    Ok(Json(SessionResponse {
        session,
        created_id: Some(id),
    }))
}

pub async fn add_set(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((session_id, exercise_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<SessionResponse>> {
    let (created_id, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| ledger.add_set(exercise_id))
        .await?;
    Ok(Json(SessionResponse { session, created_id }))
}

pub async fn update_set(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((session_id, exercise_id, set_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(body): Json<UpdateSetRequest>,
) -> AppResult<Json<SessionResponse>> {
    let (_, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| {
            ledger.update_set(exercise_id, set_id, body.field, &body.value)
        })
        .await?;
    Ok(snapshot_only(session))
}

pub async fn toggle_set(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((session_id, exercise_id, set_id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<SessionResponse>> {
    let (_, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| {
            ledger.toggle_set_complete(exercise_id, set_id)
        })
        .await?;
    Ok(snapshot_only(session))
}

pub async fn update_notes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((session_id, exercise_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateNotesRequest>,
) -> AppResult<Json<SessionResponse>> {
    let (_, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| {
            ledger.update_notes(exercise_id, &body.notes)
        })
        .await?;
    Ok(snapshot_only(session))
}

pub async fn toggle_rest_timer(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((session_id, exercise_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<SessionResponse>> {
    let (_, session) = state
        .sessions
        .edit(auth_user.id, session_id, |ledger| ledger.toggle_rest_timer(exercise_id))
        .await?;
    Ok(snapshot_only(session))
}

/// Finish the workout. The session is over once this returns, whether or not
/// the writes went through; `persisted` and the notification tell which.
pub async fn finish_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<FinishResponse>> {
    let (completed, session) = state.sessions.finish(auth_user.id, session_id).await?;
    let outcome = reconcile(state.store.as_ref(), &completed, Utc::now()).await;

    let notification = if outcome.persisted() {
        Notification::workout_completed(
            completed.elapsed_secs,
            completed.metrics.volume,
            completed.metrics.total_sets,
        )
    } else {
        Notification::save_failed()
    };

    Ok(Json(FinishResponse {
        session,
        persisted: outcome.persisted(),
        workout: outcome.workout,
        stats: outcome.stats,
        notification,
    }))
}

pub async fn discard_session(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<DiscardResponse>> {
    let session = state.sessions.discard(auth_user.id, session_id).await?;
    tracing::info!(user_id = %auth_user.id, session_id = %session_id, "Workout session discarded");
    Ok(Json(DiscardResponse {
        session,
        notification: Notification::workout_discarded(),
    }))
}
