//! Orders and their line items.
//!
//! An order exclusively owns its items; books and users are referenced by id
//! only. Item prices are copied out of the catalog at placement time and never
//! follow later price edits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Book;
use crate::validation::{validate_quantity, validate_required_text, MAX_ADDRESS_LEN, MAX_SHORT_TEXT_LEN};

/// Fulfilment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Settlement lifecycle, independent of fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Assembles a pending order whose total is the sum of the item subtotals.
    pub fn place(
        id: Uuid,
        user_id: Uuid,
        items: &[OrderItem],
        shipping_address: String,
        payment_method: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            total_price: total_of(items),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address,
            payment_method,
            created_at: now,
            updated_at: now,
        }
    }

    /// Any status may replace any other; only administrators reach this.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Records a settlement outcome. Payment always moves fulfilment to processing.
    pub fn set_payment_status(&mut self, payment_status: PaymentStatus) {
        self.payment_status = payment_status;
        if payment_status == PaymentStatus::Paid {
            self.status = OrderStatus::Processing;
        }
        self.updated_at = Utc::now();
    }
}

/// Frozen line: book, quantity and the unit price captured at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub book_id: Uuid,
    /// Zero-based place of the line within its order.
    pub position: i32,
    pub quantity: i32,
    pub price: Decimal,
}

impl OrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

pub fn total_of(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

/// Checks and takes `quantity` units from `book`, returning the priced line.
///
/// `book` must be the row locked for the current transaction. On failure the
/// book is left untouched.
pub fn reserve_line(
    order_id: Uuid,
    position: i32,
    book: &mut Book,
    quantity: i32,
) -> AppResult<OrderItem> {
    validate_quantity(quantity)?;
    if book.stock < quantity {
        return Err(AppError::InsufficientStock(book.title.clone()));
    }
    book.stock -= quantity;
    Ok(OrderItem {
        id: Uuid::new_v4(),
        order_id,
        book_id: book.id,
        position,
        quantity,
        price: book.price,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub book_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: String,
    pub payment_method: String,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.items.is_empty() {
            return Err(AppError::validation("order must contain at least one item"));
        }
        for item in &self.items {
            validate_quantity(item.quantity)?;
        }
        validate_required_text(&self.shipping_address, "shippingAddress", MAX_ADDRESS_LEN)?;
        validate_required_text(&self.payment_method, "paymentMethod", MAX_SHORT_TEXT_LEN)?;
        Ok(())
    }
}

/// Line as presented to clients, with the referenced book resolved.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

impl OrderLineView {
    pub fn new(item: &OrderItem, book: &Book) -> Self {
        Self {
            id: item.id,
            order_id: item.order_id,
            book_id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            image_url: book.image_url.clone(),
            quantity: item.quantity,
            price: item.price,
            subtotal: item.subtotal(),
        }
    }
}

/// Order row joined with its owner's username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedOrder {
    #[sqlx(flatten)]
    pub order: Order,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub username: String,
    pub order_items: Vec<OrderLineView>,
}

/// `PUT /api/orders/{id}/status?status=…`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// `PUT /api/orders/{id}/payment-status?paymentStatus=…`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(title: &str, price: Decimal, stock: i32) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author: "Author".to_string(),
            genre: "Fiction".to_string(),
            isbn: format!("isbn-{title}"),
            price,
            stock,
            description: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    fn pending_order() -> Order {
        Order::place(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &[],
            "1 Main St".to_string(),
            "card".to_string(),
        )
    }

    #[test]
    fn two_book_order_totals_and_decrements() {
        let order_id = Uuid::new_v4();
        let mut b = book("B", dec!(12.99), 50);
        let mut c = book("C", dec!(8.50), 20);

        let lines = vec![
            reserve_line(order_id, 0, &mut b, 3).unwrap(),
            reserve_line(order_id, 1, &mut c, 2).unwrap(),
        ];
        let order = Order::place(order_id, Uuid::new_v4(), &lines, "addr".into(), "card".into());

        assert_eq!(lines[0].subtotal(), dec!(38.97));
        assert_eq!(lines[1].subtotal(), dec!(17.00));
        assert_eq!((lines[0].position, lines[1].position), (0, 1));
        assert_eq!(order.total_price, dec!(55.97));
        assert_eq!(b.stock, 47);
        assert_eq!(c.stock, 18);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[test]
    fn insufficient_stock_leaves_book_untouched() {
        let mut b = book("B", dec!(12.99), 50);
        let err = reserve_line(Uuid::new_v4(), 0, &mut b, 100).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock for book: B");
        assert_eq!(b.stock, 50);
    }

    #[test]
    fn exact_stock_can_be_sold_out() {
        let mut b = book("B", dec!(1.00), 4);
        reserve_line(Uuid::new_v4(), 0, &mut b, 4).unwrap();
        assert_eq!(b.stock, 0);
        assert!(reserve_line(Uuid::new_v4(), 0, &mut b, 1).is_err());
    }

    #[test]
    fn line_price_is_a_snapshot() {
        let mut b = book("B", dec!(12.99), 5);
        let line = reserve_line(Uuid::new_v4(), 0, &mut b, 1).unwrap();
        b.price = dec!(99.99);
        assert_eq!(line.price, dec!(12.99));
    }

    #[test]
    fn paid_forces_processing_from_any_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let mut order = pending_order();
            order.set_status(status);
            order.set_payment_status(PaymentStatus::Paid);
            assert_eq!(order.status, OrderStatus::Processing);
            assert_eq!(order.payment_status, PaymentStatus::Paid);
        }
    }

    #[test]
    fn other_payment_outcomes_keep_status() {
        let mut order = pending_order();
        order.set_status(OrderStatus::Shipped);
        order.set_payment_status(PaymentStatus::Refunded);
        assert_eq!(order.status, OrderStatus::Shipped);
    }

    #[test]
    fn status_changes_are_permissive() {
        let mut order = pending_order();
        order.set_status(OrderStatus::Delivered);
        order.set_status(OrderStatus::Pending);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn request_validation() {
        let mut request = CreateOrderRequest {
            items: vec![],
            shipping_address: "1 Main St".into(),
            payment_method: "card".into(),
        };
        assert!(request.validate().is_err());

        request.items.push(OrderItemRequest {
            book_id: Uuid::new_v4(),
            quantity: 0,
        });
        assert!(request.validate().is_err());

        request.items[0].quantity = 2;
        assert!(request.validate().is_ok());

        request.shipping_address = " ".into();
        assert!(request.validate().is_err());
    }

    #[test]
    fn status_params_use_upper_case_names() {
        let update: StatusUpdate = serde_json::from_str(r#"{"status":"SHIPPED"}"#).unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
        let update: PaymentStatusUpdate =
            serde_json::from_str(r#"{"paymentStatus":"PAID"}"#).unwrap();
        assert_eq!(update.payment_status, PaymentStatus::Paid);
    }
}
