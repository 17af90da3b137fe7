//! Bookstore backend
//!
//! Catalog browsing, accounts, order placement and reviews over PostgreSQL.
//! Every service call runs as one unit of work: a transaction is begun, the
//! repositories share it through an [`Executor`], and it is committed or rolled
//! back as a whole. Components implementing [`TransactionAware`] hear about
//! the outcome.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod executor;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;
pub mod state;
pub mod transaction_aware;
pub mod unit_of_work;
pub mod validation;

pub use error::{AppError, AppResult};
pub use executor::Executor;
pub use transaction_aware::{TransactionAware, TransactionError, TransactionResult};
pub use unit_of_work::{PostgresUnitOfWork, PostgresUnitOfWorkSession, UnitOfWork, UnitOfWorkSession};
