use uuid::Uuid;

use crate::models::Book;
use crate::{Executor, TransactionResult};

const BOOK_COLUMNS: &str =
    "id, title, author, genre, isbn, price, stock, description, image_url, created_at";

/// Catalog store bound to one unit-of-work session.
pub struct BookRepository {
    executor: Executor,
}

impl BookRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    pub async fn insert(&self, book: &Book) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query(
            "INSERT INTO books (id, title, author, genre, isbn, price, stock, description, image_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(book.stock)
        .bind(&book.description)
        .bind(&book.image_url)
        .bind(book.created_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Rewrites every editable column. Returns false when the row is gone.
    pub async fn update(&self, book: &Book) -> TransactionResult<bool> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let result = sqlx::query(
            "UPDATE books SET title = $2, author = $3, genre = $4, isbn = $5, price = $6, \
             stock = $7, description = $8, image_url = $9 WHERE id = $1",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.isbn)
        .bind(book.price)
        .bind(book.stock)
        .bind(&book.description)
        .bind(&book.image_url)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn update_stock(&self, id: Uuid, stock: i32) -> TransactionResult<()> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        sqlx::query("UPDATE books SET stock = $2 WHERE id = $1")
            .bind(id)
            .bind(stock)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> TransactionResult<bool> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find_by_id(&self, id: Uuid) -> TransactionResult<Option<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(book)
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> TransactionResult<Option<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let book =
            sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1"))
                .bind(isbn)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(book)
    }

    /// Row-locks the given books until the session ends.
    ///
    /// Rows are locked in id order so concurrent multi-book orders cannot
    /// deadlock each other. Ids with no matching row are simply absent.
    pub async fn lock_for_update(&self, ids: &[Uuid]) -> TransactionResult<Vec<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;
        Ok(books)
    }

    pub async fn list_all(&self) -> TransactionResult<Vec<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books ORDER BY title, id"
        ))
        .fetch_all(&mut **tx)
        .await?;
        Ok(books)
    }

    pub async fn list_in_stock(&self) -> TransactionResult<Vec<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE stock > 0 ORDER BY title, id"
        ))
        .fetch_all(&mut **tx)
        .await?;
        Ok(books)
    }

    /// Case-insensitive substring match on title or author.
    pub async fn search(&self, text: &str) -> TransactionResult<Vec<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE strpos(lower(title), lower($1)) > 0 OR strpos(lower(author), lower($1)) > 0 \
             ORDER BY title, id"
        ))
        .bind(text)
        .fetch_all(&mut **tx)
        .await?;
        Ok(books)
    }

    pub async fn list_by_genre(&self, genre: &str) -> TransactionResult<Vec<Book>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE genre = $1 ORDER BY title, id"
        ))
        .bind(genre)
        .fetch_all(&mut **tx)
        .await?;
        Ok(books)
    }

    pub async fn list_genres(&self) -> TransactionResult<Vec<String>> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let genres: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT genre FROM books ORDER BY genre")
                .fetch_all(&mut **tx)
                .await?;
        Ok(genres.into_iter().map(|(genre,)| genre).collect())
    }

    pub async fn count(&self) -> TransactionResult<i64> {
        let mut tx_guard = self.executor.lock().await;
        let tx = tx_guard.as_mut().ok_or(sqlx::Error::PoolClosed)?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&mut **tx)
            .await?;
        Ok(count)
    }
}
