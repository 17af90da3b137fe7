//! HTTP mapping for [`AppError`]. Bodies are plain text messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InsufficientStock(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Transaction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                "Internal server error".to_string()
            }
            AppError::Transaction(err) => {
                tracing::error!(target: "database", error = %err, "database error occurred");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionError;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InsufficientStock("Dune".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::access_denied("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_failures_are_opaque() {
        let err = AppError::Transaction(TransactionError::CommitFailed("connection reset".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
