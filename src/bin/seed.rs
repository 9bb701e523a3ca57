//! One-shot data utility: `seed --import` loads the JSON fixtures under
//! `data/`, `seed --delete` empties the collections. Exits 0 when done.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tour_booking_backend::config::Config;
use tour_booking_backend::database::pool::create_pool;
use tour_booking_backend::models::user::UserRole;
use tour_booking_backend::utils::crypto;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedTour {
    id: Uuid,
    name: String,
    duration: i32,
    max_group_size: i32,
    difficulty: String,
    ratings_average: f64,
    ratings_quantity: i32,
    price: Decimal,
    summary: String,
    description: Option<String>,
    image_cover: Option<String>,
    start_dates: Vec<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SeedUser {
    id: Uuid,
    name: String,
    email: String,
    role: UserRole,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SeedReview {
    review: String,
    rating: f64,
    tour: Uuid,
    user: Uuid,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pool = create_pool(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    match std::env::args().nth(1).as_deref() {
        Some("--import") => import(&pool).await?,
        Some("--delete") => delete(&pool).await?,
        _ => {
            eprintln!("Usage: seed --import | --delete");
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn import(pool: &PgPool) -> anyhow::Result<()> {
    let tours: Vec<SeedTour> = read_fixture("data/tours.json")?;
    let users: Vec<SeedUser> = read_fixture("data/users.json")?;
    let reviews: Vec<SeedReview> = read_fixture("data/reviews.json")?;

    for user in &users {
        let password_hash = crypto::hash_password(&user.password)?;
        sqlx::query(
            "INSERT INTO users (id, name, email, password, role, password_changed_at) \
             VALUES ($1, $2, $3, $4, $5, NOW())",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.email.to_lowercase())
        .bind(&password_hash)
        .bind(user.role)
        .execute(pool)
        .await?;
    }

    for tour in &tours {
        sqlx::query(
            "INSERT INTO tours (id, name, duration, max_group_size, difficulty, \
             ratings_average, ratings_quantity, price, summary, description, image_cover, \
             start_dates) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(tour.id)
        .bind(&tour.name)
        .bind(tour.duration)
        .bind(tour.max_group_size)
        .bind(&tour.difficulty)
        .bind(tour.ratings_average)
        .bind(tour.ratings_quantity)
        .bind(tour.price)
        .bind(&tour.summary)
        .bind(&tour.description)
        .bind(&tour.image_cover)
        .bind(&tour.start_dates)
        .execute(pool)
        .await?;
    }

    for review in &reviews {
        sqlx::query(
            "INSERT INTO reviews (review, rating, tour_id, user_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(&review.review)
        .bind(review.rating)
        .bind(review.tour)
        .bind(review.user)
        .execute(pool)
        .await?;
    }

    info!(
        users = users.len(),
        tours = tours.len(),
        reviews = reviews.len(),
        "Data successfully loaded!"
    );
    Ok(())
}

async fn delete(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM reviews").execute(pool).await?;
    sqlx::query("DELETE FROM tours").execute(pool).await?;
    sqlx::query("DELETE FROM users").execute(pool).await?;
    info!("Data successfully deleted!");
    Ok(())
}

fn read_fixture<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
