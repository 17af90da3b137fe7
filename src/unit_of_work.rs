use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

use crate::{Executor, TransactionAware, TransactionError, TransactionResult};

/// Unit of Work pattern for managing database transactions.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Session: UnitOfWorkSession;

    /// Begin a new transaction session.
    async fn begin(&self) -> TransactionResult<Self::Session>;
}

/// Represents a single database transaction session.
#[async_trait]
pub trait UnitOfWorkSession: Send + Sync {
    /// Get the executor for this session (provides access to the transaction).
    fn executor(&self) -> &Executor;

    /// Register a component that needs to be notified of transaction events.
    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>);

    /// Commit the transaction and notify all registered observers.
    async fn commit(self) -> TransactionResult<()>;

    /// Rollback the transaction and notify all registered observers.
    async fn rollback(self) -> TransactionResult<()>;
}

/// Default implementation of UnitOfWork for PostgreSQL.
#[derive(Clone)]
pub struct PostgresUnitOfWork {
    pool: Arc<PgPool>,
}

impl PostgresUnitOfWork {
    /// Create a new PostgresUnitOfWork with the given connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    type Session = PostgresUnitOfWorkSession;

    async fn begin(&self) -> TransactionResult<Self::Session> {
        let tx = self.pool.begin().await?;
        Ok(PostgresUnitOfWorkSession::new(tx))
    }
}

/// Default implementation of UnitOfWorkSession for PostgreSQL.
pub struct PostgresUnitOfWorkSession {
    executor: Executor,
    observers: Arc<RwLock<Vec<Arc<dyn TransactionAware>>>>,
}

impl PostgresUnitOfWorkSession {
    /// Create a new session from a PostgreSQL transaction.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            executor: Executor::new(tx),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn observers(&self) -> Vec<Arc<dyn TransactionAware>> {
        self.observers.read().clone()
    }
}

#[async_trait]
impl UnitOfWorkSession for PostgresUnitOfWorkSession {
    fn executor(&self) -> &Executor {
        &self.executor
    }

    fn register_transaction_aware(&self, observer: Arc<dyn TransactionAware>) {
        self.observers.write().push(observer);
    }

    async fn commit(self) -> TransactionResult<()> {
        let tx = self.executor.take_transaction().await?;
        tx.commit()
            .await
            .map_err(|e| TransactionError::CommitFailed(e.to_string()))?;

        // Observers only hear about state that is now durable
        for observer in self.observers().iter() {
            observer.on_commit().await?;
        }
        Ok(())
    }

    async fn rollback(self) -> TransactionResult<()> {
        let tx = self.executor.take_transaction().await?;
        tx.rollback()
            .await
            .map_err(|e| TransactionError::RollbackFailed(e.to_string()))?;

        for observer in self.observers().iter() {
            observer.on_rollback().await?;
        }
        Ok(())
    }
}
