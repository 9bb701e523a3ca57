//! Generic create/update/delete handlers, parameterized over a capability
//! set and instantiated per resource type. Authorization is composed in the
//! router, never here.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::AppState;

pub trait Resource {
    /// Key under which the record is returned, e.g. `"tour"`.
    const RESOURCE: &'static str;
}

#[async_trait]
pub trait Create: Resource + Sized {
    type Payload: DeserializeOwned + Validate + Send + 'static;

    async fn insert(pool: &PgPool, payload: Self::Payload) -> Result<Self>;
}

#[async_trait]
pub trait Update: Resource + Sized {
    type Payload: DeserializeOwned + Validate + Send + 'static;

    async fn update_by_id(pool: &PgPool, id: Uuid, payload: Self::Payload)
        -> Result<Option<Self>>;
}

#[async_trait]
pub trait Delete: Resource {
    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool>;
}

pub async fn create_one<R>(
    State(state): State<AppState>,
    Json(payload): Json<R::Payload>,
) -> Result<impl IntoResponse>
where
    R: Create + Serialize + Send + Sync + 'static,
{
    payload.validate()?;
    let record = R::insert(&state.pool, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": keyed(R::RESOURCE, &record)?,
        })),
    ))
}

pub async fn update_one<R>(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Json(payload): Json<R::Payload>,
) -> Result<impl IntoResponse>
where
    R: Update + Serialize + Send + Sync + 'static,
{
    payload.validate()?;
    let id = parse_id(&params)?;
    let record = R::update_by_id(&state.pool, id, payload)
        .await?
        .ok_or_else(|| not_found(R::RESOURCE))?;
    Ok(Json(json!({
        "status": "success",
        "data": keyed(R::RESOURCE, &record)?,
    })))
}

pub async fn delete_one<R>(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> Result<impl IntoResponse>
where
    R: Delete + Send + Sync + 'static,
{
    let id = parse_id(&params)?;
    if !R::delete_by_id(&state.pool, id).await? {
        return Err(not_found(R::RESOURCE));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Path params arrive as a map so the same handlers serve both flat and
/// nested mounts. The identifier is the `id` param, or the only param when
/// the route names it differently.
pub fn parse_id(params: &HashMap<String, String>) -> Result<Uuid> {
    let raw = params
        .get("id")
        .or_else(|| {
            if params.len() == 1 {
                params.values().next()
            } else {
                None
            }
        })
        .ok_or_else(|| Error::BadIdentifier("missing id".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| Error::BadIdentifier(raw.clone()))
}

fn not_found(resource: &str) -> Error {
    Error::NotFound(format!("No {} found with that ID", resource))
}

/// `{ "<resource>": record }`; the key comes from a trait constant.
fn keyed<T: Serialize>(resource: &str, record: &T) -> Result<serde_json::Value> {
    let mut data = serde_json::Map::new();
    data.insert(
        resource.to_string(),
        serde_json::to_value(record)
            .map_err(|e| Error::Anyhow(anyhow::anyhow!("could not serialize {}: {}", resource, e)))?,
    );
    Ok(serde_json::Value::Object(data))
}
