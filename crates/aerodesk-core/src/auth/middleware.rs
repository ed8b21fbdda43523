//! Token gate for the protected route group.
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/auth/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(state, require_token))
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, session};
use crate::controllers::AppState;
use crate::error::AerodeskError;
use crate::extractors::AuthUser;

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AerodeskError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AerodeskError::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AerodeskError::Unauthorized("Invalid Authorization header format".to_string())
    })
}

/// Reject the request unless it carries a valid, unrevoked bearer token.
///
/// On success the resolved [`AuthUser`] is stored in the request extensions.
pub async fn require_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AerodeskError> {
    let token = bearer_token(req.headers())?.to_string();

    let claims = auth::validate_token(&token, &state.config.jwt_secret)?;
    let user_id = claims.user_id()?;
    session::validate_session(&state.db, &token).await?;

    req.extensions_mut().insert(AuthUser { user_id, token });
    Ok(next.run(req).await)
}
