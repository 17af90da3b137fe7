//! Request body extraction with the crate's error mapping.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body. A body that is missing, malformed or of the wrong shape
/// is reported as a validation error (400) instead of axum's default 4xx.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "rejected request body");
                Err(AppError::validation(rejection.body_text()))
            }
        }
    }
}
