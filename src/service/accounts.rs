use crate::auth::{hash_password_blocking, verify_password_blocking, TokenService};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
use crate::repository::UserRepository;
use crate::service::settle;
use crate::{PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

/// Registration and login. Both hand back a bearer token.
#[derive(Clone)]
pub struct Accounts {
    uow: PostgresUnitOfWork,
    tokens: TokenService,
}

impl Accounts {
    pub fn new(uow: PostgresUnitOfWork, tokens: TokenService) -> Self {
        Self { uow, tokens }
    }

    /// New accounts always get the customer role.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;
        let password_hash = hash_password_blocking(request.password.clone()).await?;

        let session = self.uow.begin().await?;
        let outcome = async {
            let users = UserRepository::new(session.executor().clone());
            let username = request.username.trim();
            let email = request.email.trim();
            if users.exists_by_username(username).await? {
                return Err(AppError::conflict("Username is already taken!"));
            }
            if users.exists_by_email(email).await? {
                return Err(AppError::conflict("Email is already in use!"));
            }

            let mut user = User::new(username.to_string(), email.to_string(), password_hash, Role::Customer);
            user.first_name = trimmed(request.first_name);
            user.last_name = trimmed(request.last_name);
            user.address = trimmed(request.address);
            user.phone = trimmed(request.phone);
            users.create(&user).await?;
            Ok(user)
        }
        .await;
        let user = settle(session, outcome).await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse::bearer(token, &user))
    }

    /// Unknown user and wrong password fail identically.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let session = self.uow.begin().await?;
        let outcome = UserRepository::new(session.executor().clone())
            .find_by_username(request.username.trim())
            .await
            .map_err(AppError::from);
        let user = settle(session, outcome).await?;

        let verified = match &user {
            Some(user) => {
                verify_password_blocking(request.password.clone(), user.password_hash.clone()).await?
            }
            None => false,
        };
        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::debug!(username = %request.username, "login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(AuthResponse::bearer(token, &user))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
