use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::auth::jwt::token_lifetime;
use crate::error::AerodeskError;
use crate::models::session;

/// SHA-256 hash a token for safe database storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session record for the given access token.
pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    access_token: &str,
    expiry_hours: u64,
) -> Result<(), AerodeskError> {
    let now = Utc::now().naive_utc();
    let expires_at = now + token_lifetime(expiry_hours)?;

    let model = session::ActiveModel {
        user_id: Set(user_id),
        token_hash: Set(hash_token(access_token)),
        expires_at: Set(expires_at),
        revoked: Set(false),
        created_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await?;
    Ok(())
}

/// Check that an access token still has a live session (not revoked / not expired).
pub async fn validate_session<C: ConnectionTrait>(
    db: &C,
    access_token: &str,
) -> Result<(), AerodeskError> {
    let now = Utc::now().naive_utc();

    let session_model = session::Entity::find()
        .filter(session::Column::TokenHash.eq(hash_token(access_token)))
        .one(db)
        .await?
        .ok_or_else(|| AerodeskError::Unauthorized("Session not found".to_string()))?;

    if session_model.revoked {
        return Err(AerodeskError::Unauthorized(
            "Token has been revoked".to_string(),
        ));
    }

    if session_model.expires_at < now {
        return Err(AerodeskError::Unauthorized("Session has expired".to_string()));
    }

    Ok(())
}

/// Revoke the session behind an access token (logout, refresh).
pub async fn revoke_session<C: ConnectionTrait>(
    db: &C,
    access_token: &str,
) -> Result<(), AerodeskError> {
    let session_model = session::Entity::find()
        .filter(session::Column::TokenHash.eq(hash_token(access_token)))
        .one(db)
        .await?;

    if let Some(session_model) = session_model {
        let mut active: session::ActiveModel = session_model.into();
        active.revoked = Set(true);
        active.update(db).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("abc");
        assert_eq!(a, hash_token("abc"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_token("abd"));
    }
}
