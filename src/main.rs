use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod services;
mod store;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::registry::SessionRegistry;
use store::feed::ChangeFeed;
use store::postgres::PgRecordStore;
use store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub store: Arc<dyn RecordStore>,
    pub feed: ChangeFeed,
    pub sessions: SessionRegistry,
    pub rate_limiter: RateLimitState,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fittrack_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let db = db::create_pool(&config.database_url).await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let feed = ChangeFeed::new(256);
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        store: Arc::new(PgRecordStore::new(db, feed.clone())),
        feed,
        sessions: SessionRegistry::new(),
        rate_limiter: RateLimitState::new(),
    };

    services::registry::spawn_session_ticker(state.sessions.clone(), config.session_max_age_secs);
    auth::rate_limit::spawn_rate_limit_cleanup(state.rate_limiter.clone());

    let app = build_router(state).layer(cors_layer(&config));

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    // Connect info gives the rate limiter the client IP.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("Server error");
}

fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Workout sessions
        .route("/api/sessions", post(handlers::sessions::start_session))
        .route("/api/sessions/:id", get(handlers::sessions::get_session))
        .route(
            "/api/sessions/:id/exercises",
            post(handlers::sessions::add_exercise),
        )
        .route(
            "/api/sessions/:id/exercises/:exercise_id/sets",
            post(handlers::sessions::add_set),
        )
        .route(
            "/api/sessions/:id/exercises/:exercise_id/sets/:set_id",
            put(handlers::sessions::update_set),
        )
        .route(
            "/api/sessions/:id/exercises/:exercise_id/sets/:set_id/toggle",
            post(handlers::sessions::toggle_set),
        )
        .route(
            "/api/sessions/:id/exercises/:exercise_id/notes",
            put(handlers::sessions::update_notes),
        )
        .route(
            "/api/sessions/:id/exercises/:exercise_id/rest-timer",
            post(handlers::sessions::toggle_rest_timer),
        )
        .route(
            "/api/sessions/:id/finish",
            post(handlers::sessions::finish_session),
        )
        .route(
            "/api/sessions/:id/discard",
            post(handlers::sessions::discard_session),
        )
        // Stats, history, nutrition
        .route("/api/stats", get(handlers::stats::get_stats))
        .route("/api/dashboard", get(handlers::stats::get_dashboard))
        .route("/api/workouts", get(handlers::workouts::list_workouts))
        .route("/api/nutrition/plan", get(handlers::nutrition::get_plan))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins: Vec<axum::http::HeaderValue> = Vec::new();
    match config.frontend_url.parse() {
        Ok(origin) => origins.push(origin),
        Err(_) => tracing::warn!(url = %config.frontend_url, "FRONTEND_URL is not a valid origin"),
    }
    // Extra origins, e.g. testing from another device on the LAN.
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryRecordStore;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    struct TestApp {
        router: Router,
        store: MemoryRecordStore,
        token: String,
        user_id: Uuid,
    }

    fn test_app() -> TestApp {
        let config = Arc::new(Config::for_tests());
        let store = MemoryRecordStore::new();
        let state = AppState {
            db: db::create_lazy_pool(&config.database_url),
            config: config.clone(),
            store: Arc::new(store.clone()),
            feed: ChangeFeed::new(16),
            sessions: SessionRegistry::new(),
            rate_limiter: RateLimitState::new(),
        };
        let user_id = Uuid::new_v4();
        let token = auth::jwt::create_access_token(user_id, "lifter@example.com", &config).unwrap();
        TestApp {
            router: build_router(state),
            store,
            token,
            user_id,
        }
    }

    async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", app.token));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn start_push_day(app: &TestApp) -> (String, String) {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/sessions",
            Some(json!({
                "routine": { "name": "Push Day" },
                "exercises": [{ "name": "Bench Press" }, { "name": null }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let session_id = body["session"]["id"].as_str().unwrap().to_string();
        let exercise_id = body["session"]["exercises"][0]["id"].as_str().unwrap().to_string();
        (session_id, exercise_id)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 401);
    }

    #[tokio::test]
    async fn test_full_workout_flow() {
        let app = test_app();
        let (session_id, exercise_id) = start_push_day(&app).await;
        let base = format!("/api/sessions/{}/exercises/{}", session_id, exercise_id);

        let (_, body) = send(&app, Method::GET, &format!("/api/sessions/{}", session_id), None).await;
        assert_eq!(body["session"]["exercises"].as_array().unwrap().len(), 1);
        let first_set = body["session"]["exercises"][0]["sets"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let set_uri = format!("{}/sets/{}", base, first_set);
        send(&app, Method::PUT, &set_uri, Some(json!({"field": "weight", "value": 50}))).await;
        send(&app, Method::PUT, &set_uri, Some(json!({"field": "reps", "value": "10"}))).await;
        send(&app, Method::POST, &format!("{}/toggle", set_uri), None).await;

        let (status, body) = send(&app, Method::POST, &format!("{}/sets", base), None).await;
        assert_eq!(status, StatusCode::OK);
        let second_set = body["created_id"].as_str().unwrap().to_string();
        assert_eq!(body["session"]["exercises"][0]["sets"][1]["previous"], "50kg x 10");
        assert_eq!(body["session"]["exercises"][0]["sets"][1]["weight"], 50);

        let set_uri = format!("{}/sets/{}", base, second_set);
        send(&app, Method::PUT, &set_uri, Some(json!({"field": "weight", "value": 60}))).await;
        send(&app, Method::PUT, &set_uri, Some(json!({"field": "reps", "value": 8}))).await;
        let (_, body) = send(&app, Method::POST, &format!("{}/toggle", set_uri), None).await;
        assert_eq!(body["session"]["volume"], 980);
        assert_eq!(body["session"]["total_sets"], 2);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/finish", session_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persisted"], true);
        assert_eq!(body["session"]["state"], "finished");
        assert_eq!(body["workout"]["calories_burned"], 490);
        assert_eq!(body["stats"]["weekly_workout_completed"], 1);
        assert_eq!(
            body["notification"]["description"],
            "Great job! Duration: 0:00, Volume: 980kg, Sets: 2"
        );

        let (_, stats) = send(&app, Method::GET, "/api/stats", None).await;
        assert_eq!(stats["calories_burned"], 490);
        assert_eq!(app.store.stats_for(app.user_id).unwrap().goal_progress, 20);

        let (_, history) = send(&app, Method::GET, "/api/workouts", None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["type"], "strength");

        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/finish", session_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_finish_with_failed_write_still_ends_session() {
        let app = test_app();
        app.store.fail_workout_insert(true);
        let (session_id, _) = start_push_day(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/finish", session_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persisted"], false);
        assert_eq!(body["notification"]["variant"], "destructive");
        assert_eq!(body["stats"]["weekly_workout_completed"], 1);

        let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}", session_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_discard_persists_nothing() {
        let app = test_app();
        let (session_id, _) = start_push_day(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/discard", session_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["notification"]["title"], "Workout discarded");
        assert_eq!(body["session"]["state"], "discarded");
        assert!(app.store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_exercise_notes_and_rest_timer() {
        let app = test_app();
        let (session_id, _) = start_push_day(&app).await;

        let (_, body) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{}/exercises", session_id),
            None,
        )
        .await;
        let new_id = body["created_id"].as_str().unwrap().to_string();
        assert_eq!(body["session"]["exercises"][1]["name"], "New Exercise");

        let base = format!("/api/sessions/{}/exercises/{}", session_id, new_id);
        send(&app, Method::PUT, &format!("{}/notes", base), Some(json!({"notes": "slow eccentric"}))).await;
        let (_, body) = send(&app, Method::POST, &format!("{}/rest-timer", base), None).await;
        assert_eq!(body["session"]["exercises"][1]["notes"], "slow eccentric");
        assert_eq!(body["session"]["exercises"][1]["rest_timer_active"], true);
    }

    #[tokio::test]
    async fn test_dashboard_and_nutrition_create_stats_lazily() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cards"][0]["value"], "0/5");

        let (_, plan) = send(&app, Method::GET, "/api/nutrition/plan?hours_fasted=8", None).await;
        assert_eq!(plan["calorie_goal"], 2000);
        assert_eq!(plan["meals"][0]["calories"], 500);
        assert_eq!(plan["fasting"]["progress"], 50.0);
        assert_eq!(app.store.stats_inserts(), 1);
    }
}
