//! Custom Axum extractors

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde_json::Value;

use super::error::ApiError;

/// Raw JSON body; parse failures become envelope 400s instead of axum's
/// plain-text rejection. Field checks happen in `todoctl_core::validation`.
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest {
                message: rejection.body_text(),
            })?;
        Ok(Self(value))
    }
}
