//! Argon2 credential hashing

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{AppError, AppResult};

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// False for a wrong password and for a hash that does not parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking pool, off the async workers.
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {e}");
            AppError::internal("password hashing failed")
        })?
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

/// [`verify_password`] on the blocking pool, off the async workers.
pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking join error: {e}");
            AppError::internal("password verification failed")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("customer123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("customer123", &hash));
        assert!(!verify_password("customer124", &hash));
    }

    #[test]
    fn salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_pool_hash_then_verify() {
        let hash = hash_password_blocking("customer123".to_string()).await.unwrap();
        assert!(verify_password_blocking("customer123".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("wrong".to_string(), hash).await.unwrap());
    }
}
