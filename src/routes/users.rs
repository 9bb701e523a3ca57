use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, get, patch},
    Extension, Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use validator::Validate;

use crate::dto::user_dto::UpdateMePayload;
use crate::error::{Error, Result};
use crate::middleware::auth::{authenticate, CurrentUser};
use crate::routes::factory;
use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/users/getUser", get(get_user))
        .route("/users/updateUser", patch(update_user))
        .route("/users/deleteUser/:id", delete(delete_user))
        .route_layer(from_fn_with_state(state, authenticate));

    Router::new()
        .route("/users/getAllUsers", get(get_all_users))
        .merge(protected)
}

async fn get_all_users(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let users = state.user_service.list(&params).await?;
    Ok(Json(json!({
        "status": "success",
        "results": users.len(),
        "data": { "users": users },
    })))
}

async fn get_user(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    Ok(Json(json!({
        "status": "success",
        "data": { "user": user },
    })))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateMePayload>,
) -> Result<impl IntoResponse> {
    if payload.password.is_some() {
        return Err(Error::BadRequest(
            "This is not the route to update passwords".into(),
        ));
    }
    payload.validate()?;

    let user = state
        .user_service
        .update_profile(user.id, payload.name.as_deref(), payload.email.as_deref())
        .await?
        .ok_or_else(|| Error::NotFound("No user found with that ID".into()))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": user },
    })))
}

/// Soft delete: the record is deactivated, never removed.
async fn delete_user(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let id = factory::parse_id(&params)?;
    if !state.user_service.soft_delete(id).await? {
        return Err(Error::NotFound("No user found with that ID".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
