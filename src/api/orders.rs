use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use uuid::Uuid;

use crate::api::extract::JsonBody;
use crate::auth::Caller;
use crate::error::AppResult;
use crate::models::{CreateOrderRequest, OrderView, PaymentStatusUpdate, StatusUpdate};
use crate::state::AppState;

/// Every order route requires a bearer token.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(mine).post(place))
        .route("/api/orders/all", get(all))
        .route("/api/orders/{id}", get(by_id))
        .route("/api/orders/{id}/status", put(set_status))
        .route("/api/orders/{id}/payment-status", put(set_payment_status))
}

async fn mine(State(state): State<AppState>, caller: Caller) -> AppResult<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list_for_user(&caller).await?))
}

async fn all(State(state): State<AppState>, caller: Caller) -> AppResult<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list_all(&caller).await?))
}

async fn by_id(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.orders.get_order(&caller, id).await?))
}

async fn place(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(request): JsonBody<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OrderView>)> {
    let view = state.orders.place_order(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn set_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Query(update): Query<StatusUpdate>,
) -> AppResult<Json<OrderView>> {
    Ok(Json(state.orders.update_status(&caller, id, update.status).await?))
}

async fn set_payment_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Query(update): Query<PaymentStatusUpdate>,
) -> AppResult<Json<OrderView>> {
    let view = state
        .orders
        .update_payment_status(&caller, id, update.payment_status)
        .await?;
    Ok(Json(view))
}
