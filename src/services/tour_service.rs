use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::query::{CollectionSpec, Column, ListQuery};
use crate::database::rows;
use crate::dto::tour_dto::{CreateTourPayload, UpdateTourPayload};
use crate::error::{Error, Result};
use crate::models::review::Review;
use crate::models::tour::Tour;
use crate::routes::factory;
use crate::services::review_service;

const TOUR_COLUMNS: &str = "id, name, duration, max_group_size, difficulty, ratings_average, \
     ratings_quantity, price, summary, description, image_cover, start_dates, created_at, \
     updated_at";

pub const TOURS_COLLECTION: CollectionSpec = CollectionSpec {
    table: "tours",
    columns: &[
        Column::new("id", "id", "uuid"),
        Column::new("name", "name", "text"),
        Column::new("duration", "duration", "int4"),
        Column::new("maxGroupSize", "max_group_size", "int4"),
        Column::new("difficulty", "difficulty", "text"),
        Column::new("ratingsAverage", "ratings_average", "float8"),
        Column::new("ratingsQuantity", "ratings_quantity", "int4"),
        Column::new("price", "price", "numeric"),
        Column::new("summary", "summary", "text"),
        Column::new("description", "description", "text"),
        Column::new("imageCover", "image_cover", "text"),
        Column::array("startDates", "start_dates", "timestamptz"),
        Column::new("createdAt", "created_at", "timestamptz"),
        Column::new("updatedAt", "updated_at", "timestamptz"),
    ],
    hidden: &[],
    default_sort: "created_at",
};

/// Per-difficulty aggregate over well-rated tours.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TourStats {
    pub difficulty: String,
    pub num_tours: i64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Tour starts per month of a given year.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPlanEntry {
    pub month: i32,
    pub num_tour_starts: i64,
    pub tours: Vec<String>,
}

#[derive(Clone)]
pub struct TourService {
    pool: PgPool,
}

impl TourService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Vec<JsonValue>> {
        let query = ListQuery::from_params(params);
        let plan = query.to_sql(&TOURS_COLLECTION, None);
        rows::fetch_json(&self.pool, &plan).await
    }

    /// Single tour together with its reviews, looked up by reference.
    pub async fn find_with_reviews(&self, id: Uuid) -> Result<Option<JsonValue>> {
        let sql = format!("SELECT {} FROM tours WHERE id = $1", TOUR_COLUMNS);
        let tour = sqlx::query_as::<_, Tour>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(tour) = tour else {
            return Ok(None);
        };

        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE tour_id = $1 ORDER BY created_at DESC",
            review_service::REVIEW_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut value = serde_json::to_value(&tour)
            .map_err(|e| Error::Anyhow(anyhow::anyhow!("could not serialize tour: {}", e)))?;
        value["reviews"] = serde_json::to_value(&reviews)
            .map_err(|e| Error::Anyhow(anyhow::anyhow!("could not serialize reviews: {}", e)))?;
        Ok(Some(value))
    }

    pub async fn stats(&self) -> Result<Vec<TourStats>> {
        let stats = sqlx::query_as::<_, TourStats>(
            "SELECT UPPER(difficulty) AS difficulty, \
                    COUNT(*) AS num_tours, \
                    COALESCE(SUM(ratings_quantity), 0)::BIGINT AS num_ratings, \
                    AVG(ratings_average) AS avg_rating, \
                    AVG(price)::FLOAT8 AS avg_price, \
                    MIN(price)::FLOAT8 AS min_price, \
                    MAX(price)::FLOAT8 AS max_price \
             FROM tours \
             WHERE ratings_average >= 4.5 \
             GROUP BY UPPER(difficulty) \
             ORDER BY avg_price",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    pub async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthlyPlanEntry>> {
        let from = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| Error::BadRequest(format!("Invalid year: {}", year)))?;
        let to = Utc
            .with_ymd_and_hms(year, 12, 31, 23, 59, 59)
            .single()
            .ok_or_else(|| Error::BadRequest(format!("Invalid year: {}", year)))?;

        let plan = sqlx::query_as::<_, MonthlyPlanEntry>(
            "SELECT EXTRACT(MONTH FROM start_date)::INT4 AS month, \
                    COUNT(*)::BIGINT AS num_tour_starts, \
                    ARRAY_AGG(name) AS tours \
             FROM tours, UNNEST(start_dates) AS start_date \
             WHERE start_date >= $1 AND start_date <= $2 \
             GROUP BY EXTRACT(MONTH FROM start_date) \
             ORDER BY num_tour_starts DESC \
             LIMIT 12",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(plan)
    }
}

impl factory::Resource for Tour {
    const RESOURCE: &'static str = "tour";
}

#[async_trait]
impl factory::Create for Tour {
    type Payload = CreateTourPayload;

    async fn insert(pool: &PgPool, payload: Self::Payload) -> Result<Self> {
        let sql = format!(
            "INSERT INTO tours (name, duration, max_group_size, difficulty, ratings_average, \
             ratings_quantity, price, summary, description, image_cover, start_dates) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 4.5), COALESCE($6, 0), $7, $8, $9, $10, \
             COALESCE($11, '{{}}')) RETURNING {}",
            TOUR_COLUMNS
        );
        let tour = sqlx::query_as::<_, Tour>(&sql)
            .bind(payload.name)
            .bind(payload.duration)
            .bind(payload.max_group_size)
            .bind(payload.difficulty)
            .bind(payload.ratings_average)
            .bind(payload.ratings_quantity)
            .bind(payload.price)
            .bind(payload.summary)
            .bind(payload.description)
            .bind(payload.image_cover)
            .bind(payload.start_dates)
            .fetch_one(pool)
            .await?;
        Ok(tour)
    }
}

#[async_trait]
impl factory::Update for Tour {
    type Payload = UpdateTourPayload;

    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        payload: Self::Payload,
    ) -> Result<Option<Self>> {
        let sql = format!(
            "UPDATE tours SET \
                name = COALESCE($2, name), \
                duration = COALESCE($3, duration), \
                max_group_size = COALESCE($4, max_group_size), \
                difficulty = COALESCE($5, difficulty), \
                ratings_average = COALESCE($6, ratings_average), \
                ratings_quantity = COALESCE($7, ratings_quantity), \
                price = COALESCE($8, price), \
                summary = COALESCE($9, summary), \
                description = COALESCE($10, description), \
                image_cover = COALESCE($11, image_cover), \
                start_dates = COALESCE($12, start_dates), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            TOUR_COLUMNS
        );
        let tour = sqlx::query_as::<_, Tour>(&sql)
            .bind(id)
            .bind(payload.name)
            .bind(payload.duration)
            .bind(payload.max_group_size)
            .bind(payload.difficulty)
            .bind(payload.ratings_average)
            .bind(payload.ratings_quantity)
            .bind(payload.price)
            .bind(payload.summary)
            .bind(payload.description)
            .bind(payload.image_cover)
            .bind(payload.start_dates)
            .fetch_optional(pool)
            .await?;
        Ok(tour)
    }
}

#[async_trait]
impl factory::Delete for Tour {
    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
