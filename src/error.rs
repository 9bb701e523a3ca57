use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::config::{run_mode, RunMode};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input data. {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Duplicate field value: {0}. Please use another value!")]
    DuplicateKey(String),

    #[error("Invalid identifier: {0}")]
    BadIdentifier(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{message}")]
    Operational { status: StatusCode, message: String },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::BadRequest(_)
            | Error::DuplicateKey(_)
            | Error::BadIdentifier(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::Operational { status, .. } => *status,
            Error::Config(_) | Error::Database(_) | Error::Anyhow(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Operational errors carry a message that is safe to show a client even
    /// in production; everything else is a programming or unknown failure.
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            Error::Config(_) | Error::Database(_) | Error::Anyhow(_)
        )
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => {
                if let Some(db) = other.as_database_error() {
                    if db.code().as_deref() == Some("23505") {
                        let field = db.constraint().unwrap_or("unique field").to_string();
                        return Error::DuplicateKey(field);
                    }
                }
                Error::Database(other)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let status_label = if status.is_server_error() {
            "error"
        } else {
            "fail"
        };

        let body = match run_mode() {
            RunMode::Development => json!({
                "status": status_label,
                "message": self.to_string(),
                "error": format!("{:?}", self),
            }),
            RunMode::Production => {
                if self.is_operational() {
                    json!({
                        "status": status_label,
                        "message": self.to_string(),
                    })
                } else {
                    tracing::error!(error = ?self, "unexpected error");
                    json!({
                        "status": "error",
                        "message": "Something went very wrong!",
                    })
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(
            Error::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::DuplicateKey("users_email_key".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::BadIdentifier("nope".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Database(sqlx::Error::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn operational_flag_hides_programming_errors() {
        assert!(Error::NotFound("x".into()).is_operational());
        assert!(Error::Operational {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "email failed".into(),
        }
        .is_operational());
        assert!(!Error::Database(sqlx::Error::PoolClosed).is_operational());
        assert!(!Error::Config("missing".into()).is_operational());
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        let err = Error::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
