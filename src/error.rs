use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid login or password")]
    BadCredentials,
    #[error("administrator privileges required")]
    AdminRequired,
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        Self::Internal(error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::AdminRequired => StatusCode::FORBIDDEN,
            AppError::Constraint(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand to the client; storage failures never leak detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Constraint(_) | AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Constraint(detail) => {
                tracing::error!(error = %detail, "persistence constraint violated");
            }
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
            }
            AppError::BadCredentials | AppError::AdminRequired => {
                tracing::info!(error = %self, "request rejected");
            }
            AppError::Validation(_) | AppError::NotFound(_) => {
                tracing::debug!(error = %self, "client error");
            }
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<DieselError> for AppError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => AppError::NotFound("record"),
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                ref info,
            ) => AppError::Constraint(info.message().to_string()),
            _ => AppError::internal(value),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value.message().to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::Validation(value.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::Validation(value.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(format!("{value:#}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::internal(value)
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    use super::AppError;
    use crate::validation::ValidationError;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(AppError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("user").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::AdminRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Constraint("dup".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violations_become_constraint_errors() {
        let err = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint \"users_pkey\"".to_string()),
        );
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::Constraint(_)));
        assert_eq!(app_err.public_message(), "internal server error");
    }

    #[test]
    fn validation_messages_reach_the_client() {
        let err = AppError::from(ValidationError::new("snils must be exactly 11 characters long"));
        assert_eq!(
            err.public_message(),
            "snils must be exactly 11 characters long"
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(
            AppError::NotFound("document").public_message(),
            "document not found"
        );
    }
}
