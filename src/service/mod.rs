//! Business operations. Each public call is one unit of work: begin a session,
//! run repository calls on its executor, then commit or roll back.

mod accounts;
mod catalog;
mod order_engine;
mod reviews;
mod stats;
mod stock_journal;

pub use accounts::Accounts;
pub use catalog::Catalog;
pub use order_engine::OrderEngine;
pub use reviews::Reviews;
pub use stats::{AdminStats, RevenueReport, Stats};
pub use stock_journal::{StockJournal, StockMovement, LOW_STOCK_THRESHOLD};

use crate::error::AppResult;
use crate::UnitOfWorkSession;

/// Commits on success, rolls back on failure, and hands back the outcome.
pub(crate) async fn settle<S, T>(session: S, outcome: AppResult<T>) -> AppResult<T>
where
    S: UnitOfWorkSession,
{
    match outcome {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = session.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::auth::Caller;
    use crate::models::{BookQuery, CreateOrderRequest, LoginRequest};
    use crate::repository::{BookRepository, OrderRepository};
    use crate::state::AppState;
    use crate::Executor;

    fn require_send<T: Send>(_: T) {}

    // axum only accepts handlers whose futures are `Send`, so a guard that is
    // not `Send` held across a query must fail here rather than at the router.
    fn futures_holding_the_transaction_are_send(
        state: &AppState,
        caller: &Caller,
        executor: &Executor,
        order: CreateOrderRequest,
        login: LoginRequest,
    ) {
        require_send(executor.lock());
        require_send(BookRepository::new(executor.clone()).lock_for_update(&[Uuid::nil()]));
        require_send(OrderRepository::new(executor.clone()).find_owned(Uuid::nil()));
        require_send(state.orders.place_order(caller, order));
        require_send(state.catalog.list(&BookQuery::default()));
        require_send(state.accounts.login(login));
    }

    #[test]
    fn service_and_repository_futures_are_send() {
        let check: fn(&AppState, &Caller, &Executor, CreateOrderRequest, LoginRequest) =
            futures_holding_the_transaction_are_send;
        let _ = check;
    }
}
