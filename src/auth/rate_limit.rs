use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::AppState;

const MAX_REQUESTS: u32 = 5;
const WINDOW_SECS: u64 = 60;

/// Fixed-window limiter keyed by client IP and path (single instance only).
#[derive(Clone, Default)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(remaining)` while under the limit, otherwise `Err(retry_after)`.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(WINDOW_SECS);

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) > window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= MAX_REQUESTS {
            return Err(window.saturating_sub(now.duration_since(entry.window_start)));
        }

        entry.count += 1;
        Ok(MAX_REQUESTS - entry.count)
    }

    /// Forget windows that ended a while ago.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let keep_for = Duration::from_secs(WINDOW_SECS * 2);
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.window_start) < keep_for);
        before - entries.len()
    }
}

pub fn spawn_rate_limit_cleanup(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(WINDOW_SECS * 5));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed = removed, "Rate limiter: expired windows dropped");
            }
        }
    });
}

/// Rate limiting middleware for the credential endpoints.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let path = req.uri().path().to_string();
    let key = format!("{}:{}", ip, path);

    match state.rate_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}
