use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::extract::JsonBody;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{CreateReviewRequest, ReviewView, UpdateReviewRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(create))
        .route("/api/reviews/book/{book_id}", get(for_book))
        .route("/api/reviews/{id}", put(update).delete(remove))
}

async fn for_book(
    State(state): State<AppState>,
    Path(book_id): Path<Uuid>,
) -> AppResult<Json<Vec<ReviewView>>> {
    Ok(Json(state.reviews.for_book(book_id).await?))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(request): JsonBody<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewView>)> {
    let view = state.reviews.create(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateReviewRequest>,
) -> AppResult<Json<ReviewView>> {
    Ok(Json(state.reviews.update(&caller, id, request).await?))
}

async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.reviews.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
