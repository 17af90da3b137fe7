use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::validation::{
    validate_email, validate_optional_text, validate_password, validate_username,
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN,
};

/// Permission tier, fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            first_name: None,
            last_name: None,
            address: None,
            phone: None,
            role,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_optional_text(self.first_name.as_deref(), "firstName", MAX_NAME_LEN)?;
        validate_optional_text(self.last_name.as_deref(), "lastName", MAX_NAME_LEN)?;
        validate_optional_text(self.address.as_deref(), "address", MAX_ADDRESS_LEN)?;
        validate_optional_text(self.phone.as_deref(), "phone", MAX_SHORT_TEXT_LEN)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body returned by register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl AuthResponse {
    pub fn bearer(token: String, user: &User) -> Self {
        Self {
            token,
            token_type: "Bearer",
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serialized() {
        let user = User::new(
            "reader".into(),
            "reader@bookstore.com".into(),
            "$argon2id$secret".into(),
            Role::Customer,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"CUSTOMER\""));
    }

    #[test]
    fn auth_response_shape() {
        let user = User::new("admin".into(), "a@b.co".into(), String::new(), Role::Admin);
        let json = serde_json::to_value(AuthResponse::bearer("tok".into(), &user)).unwrap();
        assert_eq!(json["type"], "Bearer");
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["token"], "tok");
    }
}
