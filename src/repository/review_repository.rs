use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{RatingSummary, Review, ReviewView};
use crate::{Executor, TransactionResult};

/// Review persistence plus the per-book rating aggregates.
pub struct ReviewRepository {
    executor: Executor,
}

impl ReviewRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn insert(&self, review: &Review) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO reviews (id, user_id, book_id, rating, comment, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.book_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    pub async fn update(&self, review: &Review) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query("UPDATE reviews SET rating = $2, comment = $3, updated_at = $4 WHERE id = $1")
            .bind(review.id)
            .bind(review.rating)
            .bind(&review.comment)
            .bind(review.updated_at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> TransactionResult<Option<Review>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, user_id, book_id, rating, comment, created_at, updated_at FROM reviews WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(review)
    }

    pub async fn find_view(&self, id: Uuid) -> TransactionResult<Option<ReviewView>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let review = sqlx::query_as::<_, ReviewView>(
            "SELECT r.id, r.user_id, r.book_id, r.rating, r.comment, r.created_at, r.updated_at, u.username \
             FROM reviews r JOIN users u ON u.id = r.user_id WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(review)
    }

    pub async fn exists_for(&self, user_id: Uuid, book_id: Uuid) -> TransactionResult<bool> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND book_id = $2)",
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(exists)
    }

    /// Newest first.
    pub async fn list_for_book(&self, book_id: Uuid) -> TransactionResult<Vec<ReviewView>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let reviews = sqlx::query_as::<_, ReviewView>(
            "SELECT r.id, r.user_id, r.book_id, r.rating, r.comment, r.created_at, r.updated_at, u.username \
             FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.book_id = $1 ORDER BY r.created_at DESC, r.id",
        )
        .bind(book_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(reviews)
    }

    /// Mean rating of a book, 0.0 when it has no reviews.
    pub async fn average_rating(&self, book_id: Uuid) -> TransactionResult<f64> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (average,): (Option<f64>,) =
            sqlx::query_as("SELECT AVG(rating)::float8 FROM reviews WHERE book_id = $1")
                .bind(book_id)
                .fetch_one(&mut **tx)
                .await?;
        Ok(average.unwrap_or(0.0))
    }

    pub async fn review_count(&self, book_id: Uuid) -> TransactionResult<i64> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }

    /// Rating summaries for many books in one round trip. Unreviewed books are absent.
    pub async fn summaries_for(
        &self,
        book_ids: &[Uuid],
    ) -> TransactionResult<HashMap<Uuid, RatingSummary>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let rows: Vec<(Uuid, f64, i64)> = sqlx::query_as(
            "SELECT book_id, AVG(rating)::float8, COUNT(*) FROM reviews \
             WHERE book_id = ANY($1) GROUP BY book_id",
        )
        .bind(book_ids)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(book_id, average_rating, total_reviews)| {
                (
                    book_id,
                    RatingSummary {
                        average_rating,
                        total_reviews,
                    },
                )
            })
            .collect())
    }
}
