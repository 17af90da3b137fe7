//! REST surface
//!
//! Handlers are thin: extract, call one service operation, wrap the result.
//! Identity comes from the [`Caller`](crate::auth::Caller) extractor, so a
//! missing or invalid token is rejected before the handler body runs.

pub mod admin;
pub mod auth;
pub mod books;
pub mod error;
pub mod extract;
pub mod health;
pub mod orders;
pub mod reviews;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(books::router())
        .merge(orders::router())
        .merge(reviews::router())
        .merge(admin::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
