use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTourPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub duration: i32,
    #[validate(range(min = 1))]
    pub max_group_size: i32,
    #[validate(length(min = 1))]
    pub difficulty: String,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Decimal,
    #[validate(length(min = 1))]
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTourPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
    #[validate(range(min = 1))]
    pub max_group_size: Option<i32>,
    #[validate(length(min = 1))]
    pub difficulty: Option<String>,
    pub ratings_average: Option<f64>,
    pub ratings_quantity: Option<i32>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1))]
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
}
