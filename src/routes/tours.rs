use axum::{
    extract::{Path, Query, State},
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::middleware::auth::{authenticate, require_roles};
use crate::models::tour::Tour;
use crate::models::user::UserRole;
use crate::routes::factory;
use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let list_protected =
        list_tours.layer(from_fn_with_state(state.clone(), authenticate));
    let delete_restricted = factory::delete_one::<Tour>
        .layer(from_fn(restrict_to_tour_managers))
        .layer(from_fn_with_state(state, authenticate));

    Router::new()
        .route("/tours/top-5-cheap", get(top_five_cheap))
        .route("/tours/tour-stats", get(tour_stats))
        .route("/tours/monthly-plan/:year", get(monthly_plan))
        .route(
            "/tours",
            get(list_protected).post(factory::create_one::<Tour>),
        )
        .route(
            "/tours/:tourId",
            get(get_tour)
                .patch(factory::update_one::<Tour>)
                .delete(delete_restricted),
        )
}

async fn restrict_to_tour_managers(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response> {
    require_roles(&[UserRole::Admin, UserRole::LeadGuide], req, next).await
}

#[utoipa::path(
    get,
    path = "/tours",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys, '-' for descending"),
        ("fields" = Option<String>, Query, description = "Comma-separated projection")
    ),
    responses(
        (status = 200, description = "List of tours"),
        (status = 401, description = "Not authenticated")
    )
)]
async fn list_tours(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let tours = state.tour_service.list(&params).await?;
    Ok(Json(json!({
        "status": "success",
        "results": tours.len(),
        "data": { "tours": tours },
    })))
}

#[utoipa::path(
    get,
    path = "/tours/top-5-cheap",
    responses(
        (status = 200, description = "Five best-rated, cheapest tours")
    )
)]
async fn top_five_cheap(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let mut params = params;
    params.insert("limit".to_string(), "5".to_string());
    params.insert("sort".to_string(), "-ratingsAverage,price".to_string());
    params.insert(
        "fields".to_string(),
        "name,price,ratingsAverage,summary,difficulty".to_string(),
    );

    let tours = state.tour_service.list(&params).await?;
    Ok(Json(json!({
        "status": "success",
        "results": tours.len(),
        "data": { "tours": tours },
    })))
}

#[utoipa::path(
    get,
    path = "/tours/{tourId}",
    params(
        ("tourId" = String, Path, description = "Tour ID")
    ),
    responses(
        (status = 200, description = "Tour with its reviews"),
        (status = 404, description = "Tour not found")
    )
)]
async fn get_tour(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let id = factory::parse_id(&params)?;
    let tour = state
        .tour_service
        .find_with_reviews(id)
        .await?
        .ok_or_else(|| Error::NotFound("No tour found with that ID".into()))?;
    Ok(Json(json!({
        "status": "success",
        "data": { "tour": tour },
    })))
}

#[utoipa::path(
    get,
    path = "/tours/tour-stats",
    responses(
        (status = 200, description = "Aggregate statistics per difficulty")
    )
)]
async fn tour_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.tour_service.stats().await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "stats": stats },
    })))
}

#[utoipa::path(
    get,
    path = "/tours/monthly-plan/{year}",
    params(
        ("year" = i32, Path, description = "Calendar year")
    ),
    responses(
        (status = 200, description = "Tour starts grouped by month")
    )
)]
async fn monthly_plan(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<impl IntoResponse> {
    let year: i32 = year
        .parse()
        .map_err(|_| Error::BadRequest(format!("Invalid year: {}", year)))?;
    let plan = state.tour_service.monthly_plan(year).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "plan": plan },
    })))
}
