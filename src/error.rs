//! Domain error taxonomy shared by services and the HTTP layer.
//!
//! Services return [`AppResult`]; repositories return
//! [`TransactionResult`](crate::TransactionResult) and are lifted with `?`.
//! Constraint violations reported by Postgres are translated into
//! [`AppError::Conflict`] so a lost race on a unique key reads the same as the
//! pre-check that normally catches it.

use crate::transaction_aware::Violation;
use crate::TransactionError;

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Carries the title of the book that could not be reserved.
    #[error("Insufficient stock for book: {0}")]
    InsufficientStock(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    /// Unexpected failure outside the database; the detail is logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Transaction(TransactionError),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err.violation() {
            Some((Violation::Unique, constraint)) => {
                Self::Conflict(unique_violation_message(constraint).to_string())
            }
            Some((Violation::ForeignKey, constraint)) => {
                Self::Conflict(foreign_key_violation_message(constraint).to_string())
            }
            None => Self::Transaction(err),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        TransactionError::from(err).into()
    }
}

fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("books_isbn_key") => "Book with this ISBN already exists",
        Some("users_username_key") => "Username is already taken!",
        Some("users_email_key") => "Email is already in use!",
        Some("reviews_user_book_key") => "You have already reviewed this book",
        _ => "Resource already exists",
    }
}

fn foreign_key_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("order_items_book_id_fkey") => "Book is referenced by existing orders",
        Some("orders_user_id_fkey") => "User has existing orders",
        _ => "Resource is referenced by other records",
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_the_book() {
        let err = AppError::InsufficientStock("Moby Dick".to_string());
        assert_eq!(err.to_string(), "Insufficient stock for book: Moby Dick");
    }

    #[test]
    fn constraint_names_pick_conflict_messages() {
        assert_eq!(
            unique_violation_message(Some("reviews_user_book_key")),
            "You have already reviewed this book"
        );
        assert_eq!(
            unique_violation_message(Some("something_else")),
            "Resource already exists"
        );
        assert_eq!(
            foreign_key_violation_message(Some("order_items_book_id_fkey")),
            "Book is referenced by existing orders"
        );
    }

    #[test]
    fn plain_database_errors_stay_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(
            err,
            AppError::Transaction(TransactionError::DatabaseError(_))
        ));
    }
}
