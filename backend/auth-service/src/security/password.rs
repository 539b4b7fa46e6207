//! Password hashing and verification using bcrypt.

use crate::error::{AuthError, Result};

/// bcrypt work factor used for every stored hash.
pub const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

/// Verify a password against a stored hash.
///
/// A malformed stored hash is reported as `InvalidCredentials` rather than an
/// internal error; the caller must not learn whether the account exists in a
/// usable state.
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => Err(AuthError::InvalidCredentials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "SecurePass123!";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn test_wrong_password() {
        let password = "SecurePass123!";
        let hash = hash_password(password).unwrap();
        assert!(matches!(
            verify_password("WrongPass123!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_malformed_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("whatever", "not-a-bcrypt-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
