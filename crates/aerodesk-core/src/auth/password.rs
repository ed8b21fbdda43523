use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AerodeskError;

/// Hash a plaintext password using Argon2.
pub fn hash_password(password: &str) -> Result<String, AerodeskError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AerodeskError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AerodeskError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AerodeskError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("boarding-pass").unwrap();
        assert_ne!(hash, "boarding-pass");
        assert!(verify_password("boarding-pass", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
