//! API error types with IntoResponse
//!
//! Errors are converted to envelope responses with appropriate status codes.
//! Store failures are logged and reported with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todoctl_core::{StoreError, ValidationErrors};

use super::response::Envelope;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Payload failed validation (400)
    Validation(ValidationErrors),

    /// Body was not valid JSON (400)
    BadRequest { message: String },

    /// No todo with this id, or the id cannot exist (404)
    NotFound { id: String },

    /// No route matched (404)
    RouteNotFound { method: String, path: String },

    /// Storage backend failed (500, logged)
    Store {
        action: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    /// Map a store error raised while performing `action` (e.g. "update todo").
    ///
    /// Malformed ids become 404 so storage id formats never leak.
    pub fn store(action: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| match source {
            StoreError::MalformedId { id } => ApiError::NotFound { id },
            source => ApiError::Store { action, source },
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(e) => {
                Envelope::failure("Validation error", e.to_string())
                    .with_details(e.into_violations())
            }
            Self::BadRequest { message } => Envelope::failure("Invalid request body", message),
            Self::NotFound { id } => Envelope::failure(
                "Todo not found",
                format!("Todo with id {} does not exist", id),
            ),
            Self::RouteNotFound { method, path } => {
                Envelope::failure("Route not found", format!("Cannot {} {}", method, path))
            }
            Self::Store { action, source } => {
                // Log the actual error, return generic message
                tracing::error!(action, error = %source, "store error");
                Envelope::failure(
                    format!("Failed to {}", action),
                    "an internal error occurred",
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};
    use todoctl_core::validate_create;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn validation_error_is_400_with_details() {
        let err = validate_create(&json!({})).unwrap_err();
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Validation error");
        assert_eq!(body["details"][0]["field"], "title");
    }

    #[tokio::test]
    async fn malformed_id_is_404() {
        let err = ApiError::store("fetch todo")(StoreError::malformed_id("xyz"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn store_failure_is_500_without_detail() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let response = ApiError::store("create todo")(io.into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to create todo");
        assert!(!body["message"].as_str().unwrap().contains("disk on fire"));
    }
}
