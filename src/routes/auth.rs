use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{patch, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::dto::auth_dto::{
    ForgotPasswordPayload, LoginPayload, ResetPasswordPayload, SignupPayload,
    UpdatePasswordPayload,
};
use crate::error::{Error, Result};
use crate::middleware::auth::{authenticate, CurrentUser};
use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth-users/updatePassword", patch(update_password))
        .route_layer(from_fn_with_state(state, authenticate));

    Router::new()
        .route("/auth-users/signup", post(signup))
        .route("/auth-users/login", post(login))
        .route("/auth-users/forgotPassword", post(forgot_password))
        .route("/auth-users/resetPassword/:token", patch(reset_password))
        .merge(protected)
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let (token, user) = state
        .auth_service
        .signup(&payload.name, &payload.email, payload.role, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "token": token,
            "message": "User created successfully",
            "data": { "user": user },
        })),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(Error::BadRequest("Please provide email and password".into()));
    };

    let token = state.auth_service.login(&email, &password).await?;
    Ok(Json(json!({
        "status": "success",
        "token": token,
        "message": "User logged in successfully",
    })))
}

async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .auth_service
        .forgot_password(&payload.email, &state.email_service)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Token sent to email!",
    })))
}

async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let token = state
        .auth_service
        .reset_password(&token, &payload.password)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "token": token,
    })))
}

async fn update_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let token = state
        .auth_service
        .update_password(&user, &payload.current_password, &payload.entered_password)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "token": token,
    })))
}
