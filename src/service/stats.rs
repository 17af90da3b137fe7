use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::repository::OrderRepository;
use crate::service::settle;
use crate::{PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

/// Trailing window used by the dashboard.
pub const DASHBOARD_WINDOW_DAYS: i64 = 30;
pub const MAX_REPORT_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub recent_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub revenue: Decimal,
    pub period: String,
}

impl RevenueReport {
    fn new(revenue: Decimal, days: i64) -> Self {
        Self {
            revenue,
            period: format!("{days} days"),
        }
    }
}

/// Revenue aggregates over paid orders. Administrator only.
#[derive(Clone)]
pub struct Stats {
    uow: PostgresUnitOfWork,
}

impl Stats {
    pub fn new(uow: PostgresUnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn dashboard(&self, caller: &Caller) -> AppResult<AdminStats> {
        caller.require_admin()?;
        let since = Utc::now() - Duration::days(DASHBOARD_WINDOW_DAYS);

        let session = self.uow.begin().await?;
        let outcome = async {
            let orders = OrderRepository::new(session.executor().clone());
            Ok(AdminStats {
                total_revenue: orders.paid_revenue_since(since).await?,
                total_orders: orders.count().await?,
                recent_orders: orders.count_since(since).await?,
            })
        }
        .await;
        settle(session, outcome).await
    }

    /// Paid revenue over the trailing `days`.
    pub async fn revenue(&self, caller: &Caller, days: i64) -> AppResult<RevenueReport> {
        caller.require_admin()?;
        validate_days(days)?;
        let since = Utc::now() - Duration::days(days);

        let session = self.uow.begin().await?;
        let outcome = OrderRepository::new(session.executor().clone())
            .paid_revenue_since(since)
            .await
            .map(|revenue| RevenueReport::new(revenue, days))
            .map_err(AppError::from);
        settle(session, outcome).await
    }
}

fn validate_days(days: i64) -> AppResult<()> {
    if (1..=MAX_REPORT_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "days must be between 1 and {MAX_REPORT_DAYS}"
        )))
    }
}
