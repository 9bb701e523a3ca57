use serde::Deserialize;
use validator::Validate;

use crate::models::user::UserRole;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupPayload {
    #[validate(length(min = 1, message = "Please tell us your name!"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub role: Option<UserRole>,
    #[validate(length(min = 8, message = "Please provide a password of at least 8 characters"))]
    pub password: String,
}

/// Both fields optional so a missing one becomes an operational 400 rather
/// than a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordPayload {
    #[validate(length(min = 8, message = "Please provide a password of at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordPayload {
    pub current_password: String,
    #[validate(length(min = 8, message = "Please provide a password of at least 8 characters"))]
    pub entered_password: String,
}
