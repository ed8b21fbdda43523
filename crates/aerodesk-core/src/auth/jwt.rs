use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AerodeskError;

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Unique token ID; two tokens issued in the same second still differ
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into a user ID.
    pub fn user_id(&self) -> Result<i32, AerodeskError> {
        self.sub
            .parse()
            .map_err(|_| AerodeskError::Unauthorized("Invalid user ID in token".to_string()))
    }
}

/// A freshly signed access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Longest accepted token lifetime: one year.
pub const MAX_EXPIRY_HOURS: u64 = 24 * 366;

/// Convert a configured expiry into a lifetime, rejecting zero and values
/// above [`MAX_EXPIRY_HOURS`].
pub fn token_lifetime(expiry_hours: u64) -> Result<Duration, AerodeskError> {
    if expiry_hours == 0 || expiry_hours > MAX_EXPIRY_HOURS {
        return Err(AerodeskError::Internal(format!(
            "token expiry must be between 1 and {MAX_EXPIRY_HOURS} hours, got {expiry_hours}"
        )));
    }
    i64::try_from(expiry_hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(|| AerodeskError::Internal(format!("token expiry out of range: {expiry_hours}")))
}

/// Create a signed JWT for a user.
pub fn create_token(
    user_id: i32,
    secret: &str,
    expiry_hours: u64,
) -> Result<IssuedToken, AerodeskError> {
    let now = Utc::now();
    let lifetime = token_lifetime(expiry_hours)?;
    let expires = now + lifetime;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires.timestamp() as usize,
        iat: now.timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AerodeskError::Internal(format!("Failed to create token: {}", e)))?;

    Ok(IssuedToken {
        token,
        expires_in: lifetime.num_seconds(),
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AerodeskError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AerodeskError::Unauthorized(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}
