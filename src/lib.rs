pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::error::Result;
use crate::services::{
    auth_service::AuthService, email_service::EmailService, review_service::ReviewService,
    tour_service::TourService, user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub tour_service: TourService,
    pub review_service: ReviewService,
    pub email_service: EmailService,
}

impl AppState {
    /// Wires the services; configuration values are handed in here once and
    /// never read from ambient state afterwards.
    pub fn new(pool: PgPool, config: &Config) -> Result<Self> {
        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(user_service.clone(), config.jwt_secret.clone());
        let tour_service = TourService::new(pool.clone());
        let review_service = ReviewService::new(pool.clone());
        let email_service = EmailService::new(&config.email)?;

        Ok(Self {
            pool,
            auth_service,
            user_service,
            tour_service,
            review_service,
            email_service,
        })
    }
}
