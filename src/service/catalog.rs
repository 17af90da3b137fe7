use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::models::{Book, BookDraft, BookQuery, BookView};
use crate::repository::{BookRepository, ReviewRepository};
use crate::service::settle;
use crate::{Executor, PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

/// Catalog reads are public; edits need the administrator role.
#[derive(Clone)]
pub struct Catalog {
    uow: PostgresUnitOfWork,
}

impl Catalog {
    pub fn new(uow: PostgresUnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<BookView>> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let books = BookRepository::new(session.executor().clone());
            let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let genre = query.genre.as_deref().map(str::trim).filter(|s| !s.is_empty());
            let found = match (search, genre) {
                (Some(text), _) => books.search(text).await?,
                (None, Some(genre)) => books.list_by_genre(genre).await?,
                (None, None) if query.in_stock => books.list_in_stock().await?,
                (None, None) => books.list_all().await?,
            };
            let found = if query.in_stock {
                found.into_iter().filter(|book| book.stock > 0).collect()
            } else {
                found
            };
            with_ratings(session.executor(), found).await
        }
        .await;
        settle(session, outcome).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BookView> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let book = BookRepository::new(session.executor().clone())
                .find_by_id(id)
                .await?
                .ok_or_else(|| book_not_found(id))?;
            rated(session.executor(), book).await
        }
        .await;
        settle(session, outcome).await
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<BookView> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let book = BookRepository::new(session.executor().clone())
                .find_by_isbn(isbn.trim())
                .await?
                .ok_or_else(|| AppError::not_found(format!("Book not found with ISBN: {isbn}")))?;
            rated(session.executor(), book).await
        }
        .await;
        settle(session, outcome).await
    }

    /// Distinct genres, alphabetical.
    pub async fn genres(&self) -> AppResult<Vec<String>> {
        let session = self.uow.begin().await?;
        let outcome = BookRepository::new(session.executor().clone())
            .list_genres()
            .await
            .map_err(AppError::from);
        settle(session, outcome).await
    }

    pub async fn create(&self, caller: &Caller, draft: BookDraft) -> AppResult<BookView> {
        caller.require_admin()?;
        draft.validate()?;

        let session = self.uow.begin().await?;
        let outcome = async {
            let books = BookRepository::new(session.executor().clone());
            if books.find_by_isbn(draft.isbn.trim()).await?.is_some() {
                return Err(duplicate_isbn(&draft.isbn));
            }
            let book = draft.into_book();
            books.insert(&book).await?;
            Ok(BookView {
                book,
                rating: Default::default(),
            })
        }
        .await;
        let view = settle(session, outcome).await?;
        tracing::info!(book_id = %view.book.id, isbn = %view.book.isbn, by = %caller.username, "book created");
        Ok(view)
    }

    /// Replaces the editable fields. Stock is only rewritten when supplied.
    pub async fn update(&self, caller: &Caller, id: Uuid, draft: BookDraft) -> AppResult<BookView> {
        caller.require_admin()?;
        draft.validate()?;

        let session = self.uow.begin().await?;
        let outcome = async {
            let books = BookRepository::new(session.executor().clone());
            let mut book = books.find_by_id(id).await?.ok_or_else(|| book_not_found(id))?;
            if let Some(other) = books.find_by_isbn(draft.isbn.trim()).await? {
                if other.id != id {
                    return Err(duplicate_isbn(&draft.isbn));
                }
            }
            draft.apply_to(&mut book);
            if !books.update(&book).await? {
                return Err(book_not_found(id));
            }
            rated(session.executor(), book).await
        }
        .await;
        let view = settle(session, outcome).await?;
        tracing::info!(book_id = %id, by = %caller.username, "book updated");
        Ok(view)
    }

    /// Reviews go with the book; a book that appears on orders cannot be deleted.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> AppResult<()> {
        caller.require_admin()?;

        let session = self.uow.begin().await?;
        let outcome = match BookRepository::new(session.executor().clone()).delete(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(book_not_found(id)),
            Err(e) => Err(AppError::from(e)),
        };
        settle(session, outcome).await?;
        tracing::info!(book_id = %id, by = %caller.username, "book deleted");
        Ok(())
    }
}

async fn rated(executor: &Executor, book: Book) -> AppResult<BookView> {
    let reviews = ReviewRepository::new(executor.clone());
    let average_rating = reviews.average_rating(book.id).await?;
    let total_reviews = reviews.review_count(book.id).await?;
    Ok(BookView {
        book,
        rating: crate::models::RatingSummary {
            average_rating,
            total_reviews,
        },
    })
}

async fn with_ratings(executor: &Executor, books: Vec<Book>) -> AppResult<Vec<BookView>> {
    let ids: Vec<Uuid> = books.iter().map(|book| book.id).collect();
    let mut summaries = ReviewRepository::new(executor.clone())
        .summaries_for(&ids)
        .await?;
    Ok(books
        .into_iter()
        .map(|book| BookView {
            rating: summaries.remove(&book.id).unwrap_or_default(),
            book,
        })
        .collect())
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Book not found with id: {id}"))
}

fn duplicate_isbn(isbn: &str) -> AppError {
    AppError::conflict(format!("Book with ISBN {} already exists", isbn.trim()))
}
