use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::Book;
use crate::{TransactionAware, TransactionResult};

/// Remaining stock below which a committed sale raises a warning.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct StockMovement {
    pub book_id: Uuid,
    pub title: String,
    pub taken: i32,
    pub remaining: i32,
}

impl StockMovement {
    pub fn is_low(&self) -> bool {
        self.remaining < LOW_STOCK_THRESHOLD
    }
}

/// Buffers the stock taken by one order placement and reports it once the
/// transaction outcome is known.
#[derive(Default)]
pub struct StockJournal {
    pending: Mutex<Vec<StockMovement>>,
    committed: Mutex<Vec<StockMovement>>,
}

impl StockJournal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, book: &Book, taken: i32) {
        self.pending.lock().push(StockMovement {
            book_id: book.id,
            title: book.title.clone(),
            taken,
            remaining: book.stock,
        });
    }

    /// Movements made durable by the last commit.
    pub fn committed(&self) -> Vec<StockMovement> {
        self.committed.lock().clone()
    }
}

#[async_trait]
impl TransactionAware for StockJournal {
    async fn on_commit(&self) -> TransactionResult<()> {
        let movements = std::mem::take(&mut *self.pending.lock());
        for movement in &movements {
            tracing::info!(
                book_id = %movement.book_id,
                taken = movement.taken,
                remaining = movement.remaining,
                "stock reserved"
            );
            if movement.is_low() {
                tracing::warn!(
                    book_id = %movement.book_id,
                    title = %movement.title,
                    remaining = movement.remaining,
                    "low stock"
                );
            }
        }
        *self.committed.lock() = movements;
        Ok(())
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        let discarded = std::mem::take(&mut *self.pending.lock());
        tracing::debug!(discarded = discarded.len(), "stock reservation rolled back");
        Ok(())
    }
}
