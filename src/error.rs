//! Application-level error type for HTTP handlers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::shopping_list::store::StoreError;
use crate::shopping_list::validation::ValidationError;

/// Errors a handler can surface to the client.
///
/// Implements [`IntoResponse`]: validation failures become a 400 with a
/// JSON description, unknown items an empty 404.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => {
                tracing::debug!(
                    location = ?err.location,
                    keys = ?err.keys,
                    "Request rejected: {}",
                    err
                );
                let status = StatusCode::BAD_REQUEST;
                let body = json!({
                    "statusCode": status.as_u16(),
                    "error": "Bad Request",
                    "message": err.message,
                    "validation": {
                        "source": err.location,
                        "keys": err.keys,
                    },
                });
                (status, Json(body)).into_response()
            }
            AppError::Store(StoreError::NotFound(id)) => {
                tracing::debug!(%id, "Item not found");
                StatusCode::NOT_FOUND.into_response()
            }
        }
    }
}
