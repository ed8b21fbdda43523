use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AerodeskError;

/// The authenticated caller of a protected route.
///
/// Populated by [`require_token`](crate::auth::middleware::require_token);
/// handlers outside the protected group get `401 Unauthorized`.
///
/// ```rust,ignore
/// async fn me(user: AuthUser) -> impl IntoResponse {
///     // user.user_id, user.token
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    /// The raw bearer token presented with the request
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AerodeskError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AerodeskError::Unauthorized("Authentication required".to_string()))
    }
}
