//! Order placement and the order lifecycle.
//!
//! Placement runs in a single transaction: every referenced book row is locked,
//! checked and decremented, then the order and its items are inserted. Any
//! failure rolls the whole attempt back, so neither a partial order nor a
//! partial stock decrement is ever visible.

use std::collections::HashMap;

use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::models::{
    reserve_line, Book, CreateOrderRequest, Order, OrderLineView, OrderStatus, OrderView,
    OwnedOrder, PaymentStatus,
};
use crate::repository::{BookRepository, OrderRepository, UserRepository};
use crate::service::{settle, StockJournal};
use crate::{Executor, PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

#[derive(Clone)]
pub struct OrderEngine {
    uow: PostgresUnitOfWork,
}

impl OrderEngine {
    pub fn new(uow: PostgresUnitOfWork) -> Self {
        Self { uow }
    }

    /// Reserves stock for every requested line and records the order.
    pub async fn place_order(
        &self,
        caller: &Caller,
        request: CreateOrderRequest,
    ) -> AppResult<OrderView> {
        request.validate()?;

        let session = self.uow.begin().await?;
        let journal = StockJournal::new();
        session.register_transaction_aware(journal.clone());

        let outcome = place(session.executor(), caller, request, &journal).await;
        let view = settle(session, outcome).await?;

        tracing::info!(
            order_id = %view.order.id,
            user = %view.username,
            total = %view.order.total_price,
            lines = view.order_items.len(),
            "order placed"
        );
        Ok(view)
    }

    /// The caller's own orders, newest first.
    pub async fn list_for_user(&self, caller: &Caller) -> AppResult<Vec<OrderView>> {
        let session = self.uow.begin().await?;
        let orders = OrderRepository::new(session.executor().clone());
        let outcome = match orders.list_for_user(caller.user_id).await {
            Ok(owned) => assemble(&orders, owned).await,
            Err(e) => Err(e.into()),
        };
        settle(session, outcome).await
    }

    pub async fn list_all(&self, caller: &Caller) -> AppResult<Vec<OrderView>> {
        caller.require_admin()?;
        let session = self.uow.begin().await?;
        let orders = OrderRepository::new(session.executor().clone());
        let outcome = match orders.list_all().await {
            Ok(owned) => assemble(&orders, owned).await,
            Err(e) => Err(e.into()),
        };
        settle(session, outcome).await
    }

    /// Visible to the owner and to administrators.
    pub async fn get_order(&self, caller: &Caller, id: Uuid) -> AppResult<OrderView> {
        let session = self.uow.begin().await?;
        let outcome = load_view(session.executor(), id).await.and_then(|view| {
            if caller.owns_or_admin(view.order.user_id) {
                Ok(view)
            } else {
                Err(AppError::access_denied("Access denied"))
            }
        });
        settle(session, outcome).await
    }

    /// Administrator override: any status may be set regardless of the current one.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: OrderStatus,
    ) -> AppResult<OrderView> {
        caller.require_admin()?;
        let view = self
            .transition(id, |order| order.set_status(status))
            .await?;
        tracing::info!(order_id = %id, status = ?view.order.status, by = %caller.username, "order status updated");
        Ok(view)
    }

    /// Marking an order paid also moves it to processing.
    pub async fn update_payment_status(
        &self,
        caller: &Caller,
        id: Uuid,
        payment_status: PaymentStatus,
    ) -> AppResult<OrderView> {
        caller.require_admin()?;
        let view = self
            .transition(id, |order| order.set_payment_status(payment_status))
            .await?;
        tracing::info!(
            order_id = %id,
            payment_status = ?view.order.payment_status,
            status = ?view.order.status,
            by = %caller.username,
            "payment status updated"
        );
        Ok(view)
    }

    async fn transition<F>(&self, id: Uuid, apply: F) -> AppResult<OrderView>
    where
        F: FnOnce(&mut Order) + Send,
    {
        let session = self.uow.begin().await?;
        let outcome = async {
            let orders = OrderRepository::new(session.executor().clone());
            let mut order = orders
                .find_for_update(id)
                .await?
                .ok_or_else(|| order_not_found(id))?;
            apply(&mut order);
            orders.update_statuses(&order).await?;
            load_view(session.executor(), id).await
        }
        .await;
        settle(session, outcome).await
    }
}

async fn place(
    executor: &Executor,
    caller: &Caller,
    request: CreateOrderRequest,
    journal: &StockJournal,
) -> AppResult<OrderView> {
    let owner = UserRepository::new(executor.clone())
        .find_by_id(caller.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found: {}", caller.username)))?;

    let books = BookRepository::new(executor.clone());
    let mut book_ids: Vec<Uuid> = request.items.iter().map(|item| item.book_id).collect();
    book_ids.sort_unstable();
    book_ids.dedup();

    let mut locked: HashMap<Uuid, Book> = books
        .lock_for_update(&book_ids)
        .await?
        .into_iter()
        .map(|book| (book.id, book))
        .collect();

    let order_id = Uuid::new_v4();
    let mut items = Vec::with_capacity(request.items.len());
    let mut taken: HashMap<Uuid, i32> = HashMap::new();
    for (position, requested) in (0i32..).zip(&request.items) {
        let book = locked
            .get_mut(&requested.book_id)
            .ok_or_else(|| book_not_found(requested.book_id))?;
        let item = reserve_line(order_id, position, book, requested.quantity)?;
        *taken.entry(book.id).or_default() += item.quantity;
        items.push(item);
    }

    for book_id in &book_ids {
        if let (Some(book), Some(quantity)) = (locked.get(book_id), taken.get(book_id)) {
            books.update_stock(book.id, book.stock).await?;
            journal.record(book, *quantity);
        }
    }

    let order = Order::place(
        order_id,
        owner.id,
        &items,
        request.shipping_address.trim().to_string(),
        request.payment_method.trim().to_string(),
    );
    let orders = OrderRepository::new(executor.clone());
    orders.insert(&order).await?;
    for item in &items {
        orders.insert_item(item).await?;
    }

    let order_items = items
        .iter()
        .filter_map(|item| {
            locked
                .get(&item.book_id)
                .map(|book| OrderLineView::new(item, book))
        })
        .collect();

    Ok(OrderView {
        order,
        username: owner.username,
        order_items,
    })
}

async fn load_view(executor: &Executor, id: Uuid) -> AppResult<OrderView> {
    let orders = OrderRepository::new(executor.clone());
    let owned = orders
        .find_owned(id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    let mut views = assemble(&orders, vec![owned]).await?;
    views.pop().ok_or_else(|| order_not_found(id))
}

/// Attaches resolved line items to each order, preserving order.
async fn assemble(orders: &OrderRepository, owned: Vec<OwnedOrder>) -> AppResult<Vec<OrderView>> {
    if owned.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = owned.iter().map(|o| o.order.id).collect();
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for line in orders.lines_for(&ids).await? {
        lines_by_order.entry(line.order_id).or_default().push(line);
    }
    Ok(owned
        .into_iter()
        .map(|OwnedOrder { order, username }| OrderView {
            order_items: lines_by_order.remove(&order.id).unwrap_or_default(),
            order,
            username,
        })
        .collect())
}

fn order_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Order not found with id: {id}"))
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Book not found with id: {id}"))
}
