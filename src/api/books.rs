use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::extract::JsonBody;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{BookDraft, BookQuery, BookView};
use crate::state::AppState;

/// Reads are public; writes resolve a `Caller` and need the administrator role.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/books", get(list).post(create))
        .route("/api/books/genres", get(genres))
        .route("/api/books/isbn/{isbn}", get(by_isbn))
        .route("/api/books/{id}", get(by_id).put(update).delete(remove))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<BookView>>> {
    Ok(Json(state.catalog.list(&query).await?))
}

async fn genres(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.genres().await?))
}

async fn by_id(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<BookView>> {
    Ok(Json(state.catalog.get(id).await?))
}

async fn by_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookView>> {
    Ok(Json(state.catalog.get_by_isbn(&isbn).await?))
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(draft): JsonBody<BookDraft>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let view = state.catalog.create(&caller, draft).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    JsonBody(draft): JsonBody<BookDraft>,
) -> AppResult<Json<BookView>> {
    Ok(Json(state.catalog.update(&caller, id, draft).await?))
}

async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.catalog.delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
