//! Resolved identity of the requester and the guards built on it.
//!
//! Services take a `&Caller` explicitly; nothing reads identity from ambient state.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::access_denied("Administrator role required"))
        }
    }

    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id
    }

    /// Owner, or an administrator acting on someone else's resource.
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.owns(owner_id) || self.is_admin()
    }
}

/// Reads `Authorization: Bearer <token>`; any problem with it is a 401.
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(caller.clone());
        }

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthenticated)?;

        let caller = state.tokens.verify(token.trim())?;
        parts.extensions.insert(caller.clone());
        Ok(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> Caller {
        Caller {
            user_id: Uuid::new_v4(),
            username: "someone".into(),
            role,
        }
    }

    #[test]
    fn customer_cannot_pass_admin_gate() {
        assert!(caller(Role::Customer).require_admin().is_err());
        assert!(caller(Role::Admin).require_admin().is_ok());
    }

    #[test]
    fn ownership_with_admin_override() {
        let customer = caller(Role::Customer);
        let admin = caller(Role::Admin);
        let stranger = Uuid::new_v4();

        assert!(customer.owns_or_admin(customer.user_id));
        assert!(!customer.owns_or_admin(stranger));
        assert!(admin.owns_or_admin(stranger));
        assert!(!admin.owns(stranger));
    }
}
