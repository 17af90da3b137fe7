//! Bearer token issue and verification (HS256)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::models::{Role, User};

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("token signing failed: {e}")))
    }

    /// Resolves a token into the caller identity it was issued for.
    pub fn verify(&self, token: &str) -> AppResult<Caller> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Unauthenticated
        })?;
        Ok(Caller {
            user_id: data.claims.sub,
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User::new("reader".into(), "reader@bookstore.com".into(), String::new(), role)
    }

    #[test]
    fn issued_token_resolves_to_caller() {
        let tokens = TokenService::new("a-test-secret-that-is-long-enough", Duration::hours(1));
        let user = user(Role::Admin);
        let caller = tokens.verify(&tokens.issue(&user).unwrap()).unwrap();
        assert_eq!(caller.user_id, user.id);
        assert_eq!(caller.username, "reader");
        assert_eq!(caller.role, Role::Admin);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenService::new("first-secret-first-secret-first!", Duration::hours(1));
        let verifier = TokenService::new("second-secret-second-secret-sec!", Duration::hours(1));
        let token = issuer.issue(&user(Role::Customer)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("a-test-secret-that-is-long-enough", Duration::hours(-2));
        let token = tokens.issue(&user(Role::Customer)).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new("a-test-secret-that-is-long-enough", Duration::hours(1));
        assert!(tokens.verify("not.a.token").is_err());
    }
}
