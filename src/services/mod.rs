pub mod auth_service;
pub mod email_service;
pub mod review_service;
pub mod tour_service;
pub mod user_service;
