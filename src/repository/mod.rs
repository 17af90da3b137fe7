//! Table repositories. Each one is built from a session's [`Executor`](crate::Executor)
//! so that everything a service does in one call shares a transaction.

mod book_repository;
mod order_repository;
mod review_repository;
mod user_repository;

pub use book_repository::BookRepository;
pub use order_repository::OrderRepository;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;
