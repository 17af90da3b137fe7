use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Handle on the open transaction of a unit-of-work session.
///
/// Every repository created for a session holds a clone of the same executor,
/// so catalog reads, stock writes and order inserts all land in one
/// transaction and commit or roll back together.
#[derive(Clone, Debug)]
pub struct Executor {
    tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    /// Creates a new Executor from a PostgreSQL transaction.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    /// Locks the session's transaction slot for one statement.
    ///
    /// The slot is empty once the session has been committed or rolled back;
    /// callers map that to `PoolClosed`.
    pub async fn lock(&self) -> MutexGuard<'_, Option<Transaction<'static, Postgres>>> {
        self.tx.lock().await
    }

    /// Takes ownership of the transaction, leaving None in its place.
    /// This should only be called when committing or rolling back.
    pub(crate) async fn take_transaction(
        &self,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.tx.lock().await.take().ok_or(sqlx::Error::PoolClosed)
    }
}
