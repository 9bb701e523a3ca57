use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::review_dto::UpdateReviewPayload;
use crate::error::Result;
use crate::models::review::Review;
use crate::routes::factory;

pub const REVIEW_COLUMNS: &str = "id, review, rating, tour_id, user_id, created_at";

#[derive(Clone)]
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists reviews, optionally scoped to one tour (nested route).
    pub async fn list(&self, tour_id: Option<Uuid>) -> Result<Vec<Review>> {
        let reviews = match tour_id {
            Some(tour_id) => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {} FROM reviews WHERE tour_id = $1 ORDER BY created_at DESC",
                    REVIEW_COLUMNS
                ))
                .bind(tour_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Review>(&format!(
                    "SELECT {} FROM reviews ORDER BY created_at DESC",
                    REVIEW_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(reviews)
    }

    pub async fn create(
        &self,
        review: &str,
        rating: f64,
        tour_id: Uuid,
        user_id: Uuid,
    ) -> Result<Review> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (review, rating, tour_id, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(review)
        .bind(rating)
        .bind(tour_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }
}

impl factory::Resource for Review {
    const RESOURCE: &'static str = "review";
}

#[async_trait]
impl factory::Update for Review {
    type Payload = UpdateReviewPayload;

    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        payload: Self::Payload,
    ) -> Result<Option<Self>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET review = COALESCE($2, review), rating = COALESCE($3, rating) \
             WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(payload.review)
        .bind(payload.rating)
        .fetch_optional(pool)
        .await?;
        Ok(review)
    }
}

#[async_trait]
impl factory::Delete for Review {
    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
