use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::validation::{
    validate_optional_text, validate_price, validate_required_text, validate_stock, MAX_ISBN_LEN,
    MAX_LONG_TEXT_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN,
};

/// Catalog entry. `stock` is only ever decremented by order placement or
/// rewritten by an administrator edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create / update payload for a book.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

impl BookDraft {
    pub fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.title, "title", MAX_NAME_LEN)?;
        validate_required_text(&self.author, "author", MAX_NAME_LEN)?;
        validate_required_text(&self.genre, "genre", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&self.isbn, "isbn", MAX_ISBN_LEN)?;
        validate_price(self.price)?;
        validate_stock(self.stock.unwrap_or(0))?;
        validate_optional_text(self.description.as_deref(), "description", MAX_LONG_TEXT_LEN)?;
        validate_optional_text(self.image_url.as_deref(), "imageUrl", MAX_URL_LEN)?;
        Ok(())
    }

    /// Builds a fresh catalog entry. Missing stock means none on hand.
    pub fn into_book(self) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            price: self.price.round_dp(2),
            stock: self.stock.unwrap_or(0),
            description: self.description,
            image_url: self.image_url,
            created_at: Utc::now(),
        }
    }

    /// Overwrites the editable fields of `book`, keeping identity and creation time.
    /// An omitted stock leaves the current count untouched.
    pub fn apply_to(self, book: &mut Book) {
        book.title = self.title.trim().to_string();
        book.author = self.author.trim().to_string();
        book.genre = self.genre.trim().to_string();
        book.isbn = self.isbn.trim().to_string();
        book.price = self.price.round_dp(2);
        if let Some(stock) = self.stock {
            book.stock = stock;
        }
        book.description = self.description;
        book.image_url = self.image_url;
    }
}

/// Review aggregate for one book, computed at read time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// A book as presented by the catalog: the stored record plus its rating summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    #[serde(flatten)]
    pub book: Book,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

/// `GET /api/books` filters. `search` wins over `genre`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookQuery {
    pub search: Option<String>,
    pub genre: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}
