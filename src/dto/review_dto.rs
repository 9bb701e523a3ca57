use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewPayload {
    #[validate(length(min = 1, message = "Review can not be empty"))]
    pub review: String,
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: f64,
    /// Defaults to the tour in the path when the route is nested.
    pub tour: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateReviewPayload {
    #[validate(length(min = 1, message = "Review can not be empty"))]
    pub review: Option<String>,
    #[validate(range(min = 1.0, max = 5.0))]
    pub rating: Option<f64>,
}
