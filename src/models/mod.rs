//! Domain models
//!
//! Entities reference each other by id only; views resolve references with
//! explicit lookups.

pub mod book;
pub mod order;
pub mod review;
pub mod user;

pub use book::{Book, BookDraft, BookQuery, BookView, RatingSummary};
pub use order::{
    reserve_line, total_of, CreateOrderRequest, Order, OrderItem, OrderItemRequest,
    OrderLineView, OrderStatus, OrderView, OwnedOrder, PaymentStatus, PaymentStatusUpdate,
    StatusUpdate,
};
pub use review::{CreateReviewRequest, Review, ReviewView, UpdateReviewRequest};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, Role, User};
