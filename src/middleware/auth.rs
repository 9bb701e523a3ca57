//! Two-stage access control: authenticate resolves a bearer token to a live
//! user, require_roles checks that user against an allowed set. Failures end
//! the request through the central error responder; clients re-authenticate.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::AppState;

/// The authenticated identity, attached to request extensions for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let user = state.auth_service.authenticate_bearer(header).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Must run after `authenticate`; an absent identity means the route was
/// wired without it.
pub async fn require_roles(
    allowed: &'static [UserRole],
    req: Request,
    next: Next,
) -> Result<Response> {
    let current = req.extensions().get::<CurrentUser>().ok_or_else(|| {
        Error::Unauthenticated("You are not logged in! Please log in to get access.".into())
    })?;

    if !allowed.contains(&current.0.role) {
        return Err(Error::Forbidden(
            "You do not have permission to perform this action".into(),
        ));
    }

    Ok(next.run(req).await)
}
