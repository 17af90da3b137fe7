//! Shared application state

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Config;
use crate::service::{Accounts, Catalog, OrderEngine, Reviews, Stats};
use crate::PostgresUnitOfWork;

/// Services handed to every handler. Each one opens its own unit of work per call.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub orders: OrderEngine,
    pub reviews: Reviews,
    pub accounts: Accounts,
    pub stats: Stats,
    /// Verifies bearer tokens for the `Caller` extractor
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let uow = PostgresUnitOfWork::new(Arc::new(pool));
        let tokens = TokenService::new(&config.jwt_secret, Duration::hours(config.jwt_expiry_hours));
        Self {
            catalog: Catalog::new(uow.clone()),
            orders: OrderEngine::new(uow.clone()),
            reviews: Reviews::new(uow.clone()),
            accounts: Accounts::new(uow.clone(), tokens.clone()),
            stats: Stats::new(uow),
            tokens,
        }
    }
}
