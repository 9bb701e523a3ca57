use axum::{
    extract::{Path, State},
    handler::Handler,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{delete, get, patch},
    Extension, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::dto::review_dto::CreateReviewPayload;
use crate::error::{Error, Result};
use crate::middleware::auth::{authenticate, require_roles, CurrentUser};
use crate::models::review::Review;
use crate::models::user::UserRole;
use crate::routes::factory;
use crate::AppState;

/// One authenticated router, mounted flat and nested under a tour.
pub fn router(state: AppState) -> Router<AppState> {
    let routes = Router::new()
        .route(
            "/",
            get(list_reviews).post(create_review.layer(from_fn(restrict_to_reviewers))),
        )
        .route(
            "/update/:id",
            patch(factory::update_one::<Review>.layer(from_fn(restrict_to_review_moderators))),
        )
        .route(
            "/delete/:id",
            delete(factory::delete_one::<Review>.layer(from_fn(restrict_to_review_moderators))),
        )
        .route_layer(from_fn_with_state(state, authenticate));

    Router::new()
        .nest("/reviews", routes.clone())
        .nest("/tours/:tourId/review", routes)
}

async fn restrict_to_reviewers(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response> {
    require_roles(&[UserRole::User], req, next).await
}

async fn restrict_to_review_moderators(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response> {
    require_roles(&[UserRole::User, UserRole::Admin], req, next).await
}

async fn list_reviews(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let tour_id = parse_tour_scope(&params)?;
    let reviews = state.review_service.list(tour_id).await?;
    Ok(Json(json!({
        "status": "success",
        "results": reviews.len(),
        "data": { "reviews": reviews },
    })))
}

async fn create_review(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateReviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let tour_id = payload
        .tour
        .or(parse_tour_scope(&params)?)
        .ok_or_else(|| Error::BadRequest("A review must belong to a tour".into()))?;

    let review = state
        .review_service
        .create(&payload.review, payload.rating, tour_id, user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "review": review },
        })),
    ))
}

/// The nested mount scopes the collection to one tour; the flat mount has no
/// such param.
fn parse_tour_scope(params: &HashMap<String, String>) -> Result<Option<Uuid>> {
    params
        .get("tourId")
        .map(|raw| Uuid::parse_str(raw).map_err(|_| Error::BadIdentifier(raw.clone())))
        .transpose()
}
