use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Windowed request counter shared across the whole router.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    state: Arc<Mutex<WindowState>>,
}

impl RateLimiter {
    fn new(max: u32, window: Duration) -> Self {
        Self {
            max: max.max(1),
            window,
            state: Arc::new(Mutex::new(WindowState {
                start: Instant::now(),
                count: 0,
            })),
        }
    }

    fn allow(&self) -> bool {
        let mut guard = self.state.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();
        if now.duration_since(guard.start) >= self.window {
            guard.start = now;
            guard.count = 0;
        }
        if guard.count < self.max {
            guard.count += 1;
            true
        } else {
            false
        }
    }
}

pub async fn limit_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !state.allow() {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "status": "fail",
                "message": "Too many requests from this IP, please try again in an hour!",
            })),
        )
            .into_response();
    }
    next.run(req).await
}

pub fn new_limiter_state(max: u32, window_secs: u64) -> RateLimiter {
    RateLimiter::new(max, Duration::from_secs(window_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_after_window_budget_is_spent() {
        let limiter = RateLimiter::new(3, Duration::from_secs(3600));
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn window_resets_after_elapsing() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));
        assert!(limiter.allow());
        assert!(!limiter.allow());
        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.allow());
    }
}
