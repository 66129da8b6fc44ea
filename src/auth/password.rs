use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{ServiceError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn check_strength(plain: &str) -> ServiceResult<()> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            ServiceError::Internal(anyhow::anyhow!("hash password: {e}"))
        })
}

/// `Ok(false)` on a mismatch; a stored hash that cannot be parsed is an
/// internal error, never a failed login.
pub fn verify_password(plain: &str, stored: &str) -> ServiceResult<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        ServiceError::Internal(anyhow::anyhow!("parse password hash: {e}"))
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verify failed");
            Err(ServiceError::Internal(anyhow::anyhow!("verify password: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seller_password_verifies_against_its_hash() {
        let hash = hash_password("vendedor-2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("vendedor-2024", &hash).unwrap());
        assert!(!verify_password("vendedor-2025", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        assert_ne!(hash_password("same-password").unwrap(), hash_password("same-password").unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_internal() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert_eq!(err.code(), "INTERNAL");
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(check_strength("1234567"), Err(ServiceError::Validation(_))));
        assert!(check_strength("12345678").is_ok());
        // Counted in characters, not bytes.
        assert!(check_strength("ñññññññ").is_err());
    }
}
