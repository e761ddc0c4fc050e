use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::repository::RepositoryError;

/// Field name to human-readable messages, as returned in a 400 body.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound,
            RepositoryError::Conflict { field, message } => AppError::field(&field, message),
            RepositoryError::Database(e) => AppError::Pool(e),
            RepositoryError::Sql(e) => AppError::Database(e),
        }
    }
}

fn internal_error() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal server error" })),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not found." })),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(json!({ "detail": msg }))),
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({ "detail": msg })),
            ),
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(json!(errors))),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                internal_error()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                internal_error()
            }
            AppError::Hash(e) => {
                tracing::error!("Password hashing error: {}", e);
                internal_error()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                internal_error()
            }
        };

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    async fn response_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unsupported_media_type_returns_415() {
        assert_eq!(
            response_status(AppError::UnsupportedMediaType("text/plain".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn validation_returns_400() {
        assert_eq!(
            response_status(AppError::field("name", "This field is required.")),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_body_maps_fields_to_messages() {
        let body = response_json(AppError::field("email", "Enter a valid email address.")).await;
        assert_eq!(body, json!({ "email": ["Enter a valid email address."] }));
    }

    #[tokio::test]
    async fn not_found_body_is_detail_only() {
        let body = response_json(AppError::NotFound).await;
        assert_eq!(body, json!({ "detail": "Not found." }));
    }

    #[test]
    fn repository_conflict_becomes_field_error() {
        let err = AppError::from(RepositoryError::Conflict {
            field: "name".into(),
            message: "community with this name already exists.".into(),
        });
        match err {
            AppError::Validation(errors) => {
                assert_eq!(
                    errors["name"],
                    vec!["community with this name already exists.".to_string()]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn repository_not_found_becomes_404() {
        assert_eq!(
            response_status(AppError::from(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
