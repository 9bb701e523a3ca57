pub mod auth;
pub mod factory;
pub mod health;
pub mod reviews;
pub mod tours;
pub mod users;

use axum::{http::Uri, response::IntoResponse, routing::get, Router};

use crate::error::Error;
use crate::AppState;

/// Full application router; middleware stacks (CORS, tracing, body limit,
/// rate limiting) are layered on by the caller.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .merge(auth::router(state.clone()))
        .merge(tours::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(reviews::router(state.clone()))
        .fallback(unmatched_route)
        .with_state(state)
}

async fn unmatched_route(uri: Uri) -> impl IntoResponse {
    Error::NotFound(format!("Can't find {} on this server!", uri.path()))
}
