use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AerodeskError;

/// JSON body extractor that reports malformed input as an [`AerodeskError`]
/// so it uses the standard error envelope.
///
/// ```rust,ignore
/// async fn login(Json(payload): Json<LoginRequest>) -> impl IntoResponse {
///     // payload is deserialized from the request body
/// }
/// ```
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AerodeskError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), 64 * 1024)
            .await
            .map_err(|e| AerodeskError::BadRequest(format!("Failed to read body: {}", e)))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| AerodeskError::Validation(format!("Invalid JSON: {}", e)))?;

        Ok(Json(value))
    }
}
