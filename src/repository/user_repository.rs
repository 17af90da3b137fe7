use uuid::Uuid;

use crate::models::User;
use crate::{Executor, TransactionResult};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, address, phone, role, created_at";

/// Identity store bound to one unit-of-work session.
pub struct UserRepository {
    executor: Executor,
}

impl UserRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn create(&self, user: &User) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, address, phone, role, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.address)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> TransactionResult<Option<User>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> TransactionResult<Option<User>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(user)
    }

    pub async fn exists_by_username(&self, username: &str) -> TransactionResult<bool> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&mut **tx)
                .await?;
        Ok(exists)
    }

    pub async fn exists_by_email(&self, email: &str) -> TransactionResult<bool> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))")
                .bind(email)
                .fetch_one(&mut **tx)
                .await?;
        Ok(exists)
    }
}
