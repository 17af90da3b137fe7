use async_trait::async_trait;
use sqlx::error::ErrorKind;

/// Error type for transaction-aware operations
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("Transaction rollback failed: {0}")]
    RollbackFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Integrity constraint class a rejected write ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    Unique,
    ForeignKey,
}

impl TransactionError {
    /// The violated constraint and its name, when Postgres rejected a write on one.
    pub fn violation(&self) -> Option<(Violation, Option<&str>)> {
        let Self::DatabaseError(sqlx::Error::Database(db)) = self else {
            return None;
        };
        let kind = match db.kind() {
            ErrorKind::UniqueViolation => Violation::Unique,
            ErrorKind::ForeignKeyViolation => Violation::ForeignKey,
            _ => return None,
        };
        Some((kind, db.constraint()))
    }
}

/// Result type for transaction-aware operations
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Trait for components that need to be notified of transaction lifecycle events.
///
/// Observers are registered on a session and called once the outcome of the
/// transaction is known, so anything they report reflects durable state.
#[async_trait]
pub trait TransactionAware: Send + Sync {
    /// Called after a successful transaction commit.
    async fn on_commit(&self) -> TransactionResult<()>;

    /// Called after a transaction rollback.
    ///
    /// Implementations should drop whatever they buffered during the transaction.
    async fn on_rollback(&self) -> TransactionResult<()>;
}
