use serde::Deserialize;
use validator::Validate;

/// Profile update; the password field only exists so its presence can be
/// rejected with a pointer at the password route.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMePayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    pub password: Option<String>,
}
