use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Order, OrderItem, OrderLineView, OwnedOrder};
use crate::{Executor, TransactionResult};

const OWNED_ORDER_SELECT: &str = "SELECT o.id, o.user_id, o.total_price, o.status, o.payment_status, \
     o.shipping_address, o.payment_method, o.created_at, o.updated_at, u.username \
     FROM orders o JOIN users u ON u.id = o.user_id";

/// Order and line-item persistence bound to one unit-of-work session.
pub struct OrderRepository {
    executor: Executor,
}

impl OrderRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn insert(&self, order: &Order) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO orders (id, user_id, total_price, status, payment_status, shipping_address, payment_method, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.total_price)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.shipping_address)
        .bind(&order.payment_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn insert_item(&self, item: &OrderItem) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO order_items (id, order_id, book_id, position, quantity, price) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.book_id)
        .bind(item.position)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Persists the two mutable status columns.
    pub async fn update_statuses(&self, order: &Order) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "UPDATE orders SET status = $2, payment_status = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(order.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Loads an order and locks it against concurrent status edits.
    pub async fn find_for_update(&self, id: Uuid) -> TransactionResult<Option<Order>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let order = sqlx::query_as::<_, Order>(
            "SELECT id, user_id, total_price, status, payment_status, shipping_address, payment_method, created_at, updated_at \
             FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(order)
    }

    pub async fn find_owned(&self, id: Uuid) -> TransactionResult<Option<OwnedOrder>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let order = sqlx::query_as::<_, OwnedOrder>(&format!("{OWNED_ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(order)
    }

    /// Newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> TransactionResult<Vec<OwnedOrder>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let orders = sqlx::query_as::<_, OwnedOrder>(&format!(
            "{OWNED_ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id"
        ))
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(orders)
    }

    /// Newest first.
    pub async fn list_all(&self) -> TransactionResult<Vec<OwnedOrder>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let orders = sqlx::query_as::<_, OwnedOrder>(&format!(
            "{OWNED_ORDER_SELECT} ORDER BY o.created_at DESC, o.id"
        ))
        .fetch_all(&mut **tx)
        .await?;
        Ok(orders)
    }

    /// Line items of the given orders with their books resolved, in placement order.
    pub async fn lines_for(&self, order_ids: &[Uuid]) -> TransactionResult<Vec<OrderLineView>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let lines = sqlx::query_as::<_, OrderLineView>(
            "SELECT oi.id, oi.order_id, oi.book_id, b.title, b.author, b.image_url, oi.quantity, oi.price, \
             (oi.price * oi.quantity) AS subtotal \
             FROM order_items oi JOIN books b ON b.id = oi.book_id \
             WHERE oi.order_id = ANY($1) ORDER BY oi.order_id, oi.position",
        )
        .bind(order_ids)
        .fetch_all(&mut **tx)
        .await?;
        Ok(lines)
    }

    pub async fn count(&self) -> TransactionResult<i64> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    pub async fn count_since(&self, since: DateTime<Utc>) -> TransactionResult<i64> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    /// Sum of totals over paid orders created at or after `since`.
    pub async fn paid_revenue_since(&self, since: DateTime<Utc>) -> TransactionResult<Decimal> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (revenue,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_price), 0) FROM orders WHERE payment_status = 'PAID' AND created_at >= $1",
        )
        .bind(since)
        .fetch_one(&mut **tx)
        .await?;
        Ok(revenue)
    }
}
