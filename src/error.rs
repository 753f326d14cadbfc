use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog request error: {0}")]
    CatalogTransport(#[from] reqwest::Error),

    /// The catalog answered with a non-success status. `detail` carries the
    /// upstream body when it parsed as JSON.
    #[error("Catalog error: {message}")]
    Catalog {
        message: String,
        detail: Option<Value>,
    },

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::InvalidInput(msg) | AppError::Duplicate(msg) => {
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::Catalog { message, detail } => {
                tracing::error!(error = %message, "Catalog request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch recommendations".to_string(),
                    Some(detail.unwrap_or_else(|| Value::String(message))),
                )
            }
            AppError::CatalogTransport(e) => {
                tracing::error!(error = %e, "Catalog unreachable");
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch recommendations".to_string(),
                    Some(Value::String(e.to_string())),
                )
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = match detail {
            Some(detail) => json!({ "message": message, "error": detail }),
            None => json!({ "message": message }),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let cases = [
            (
                AppError::Unauthenticated("no token".into()).into_response(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Duplicate("Movie already in favorites".into()).into_response(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("Review not found or unauthorized".into()).into_response(),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (response, expected) in cases {
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_catalog_error_maps_to_bad_gateway() {
        let response = AppError::Catalog {
            message: "status 404".into(),
            detail: Some(json!({"status_message": "not found"})),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
