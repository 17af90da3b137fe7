use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::extract::JsonBody;
use crate::error::AppResult;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::state::AppState;

/// Public routes: no bearer token required.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(state.accounts.login(request).await?))
}
