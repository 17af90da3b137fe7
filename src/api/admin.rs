use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::AppResult;
use crate::service::{AdminStats, RevenueReport};
use crate::state::AppState;

/// Administrator dashboards.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/revenue", get(revenue))
}

#[derive(Debug, Deserialize)]
struct RevenueQuery {
    #[serde(default = "default_days")]
    days: i64,
}

fn default_days() -> i64 {
    30
}

async fn stats(State(state): State<AppState>, caller: Caller) -> AppResult<Json<AdminStats>> {
    Ok(Json(state.stats.dashboard(&caller).await?))
}

async fn revenue(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<RevenueQuery>,
) -> AppResult<Json<RevenueReport>> {
    Ok(Json(state.stats.revenue(&caller, query.days).await?))
}
