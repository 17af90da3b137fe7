//! Demo data for local development. Safe to run on every boot.

use rust_decimal::Decimal;

use crate::auth::hash_password_blocking;
use crate::error::AppResult;
use crate::models::{Book, BookDraft, Role, User};
use crate::repository::{BookRepository, UserRepository};
use crate::service::settle;
use crate::{Executor, PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

const COVER: &str = "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=400";

/// (title, author, genre, description)
const SAMPLE_BOOKS: [(&str, &str, &str, &str); 12] = [
    ("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", "A classic American novel about the Jazz Age."),
    ("To Kill a Mockingbird", "Harper Lee", "Fiction", "A powerful story about racial injustice."),
    ("1984", "George Orwell", "Dystopian", "A dystopian novel about totalitarianism."),
    ("Pride and Prejudice", "Jane Austen", "Romance", "A romantic novel of manners."),
    ("The Catcher in the Rye", "J.D. Salinger", "Fiction", "A controversial coming-of-age story."),
    ("Lord of the Rings", "J.R.R. Tolkien", "Fantasy", "An epic fantasy adventure."),
    ("Harry Potter", "J.K. Rowling", "Fantasy", "A magical fantasy series."),
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy", "A fantasy adventure novel."),
    ("Animal Farm", "George Orwell", "Dystopian", "A political allegory."),
    ("Brave New World", "Aldous Huxley", "Dystopian", "A dystopian social science fiction."),
    ("The Chronicles of Narnia", "C.S. Lewis", "Fantasy", "A fantasy series for children."),
    ("Moby Dick", "Herman Melville", "Adventure", "A maritime adventure novel."),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub books: usize,
}

/// Inserts the demo admin and customer if their usernames are free, and the
/// sample catalog if no books exist yet.
pub async fn seed_demo_data(uow: &PostgresUnitOfWork) -> AppResult<SeedReport> {
    let session = uow.begin().await?;
    let outcome = seed(session.executor()).await;
    let report = settle(session, outcome).await?;
    tracing::info!(users = report.users, books = report.books, "demo data seeded");
    Ok(report)
}

async fn seed(executor: &Executor) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    let users = UserRepository::new(executor.clone());
    if !users.exists_by_username("admin").await? {
        let mut admin = demo_user("admin", "admin@bookstore.com", "admin123", Role::Admin).await?;
        admin.first_name = Some("Admin".into());
        admin.last_name = Some("User".into());
        users.create(&admin).await?;
        report.users += 1;
    }
    if !users.exists_by_username("customer").await? {
        let mut customer = demo_user("customer", "customer@bookstore.com", "customer123", Role::Customer).await?;
        customer.first_name = Some("John".into());
        customer.last_name = Some("Doe".into());
        customer.address = Some("123 Main St".into());
        customer.phone = Some("123-456-7890".into());
        users.create(&customer).await?;
        report.users += 1;
    }

    let books = BookRepository::new(executor.clone());
    if books.count().await? == 0 {
        for book in sample_books() {
            books.insert(&book).await?;
            report.books += 1;
        }
    }
    Ok(report)
}

async fn demo_user(username: &str, email: &str, password: &str, role: Role) -> AppResult<User> {
    let hash = hash_password_blocking(password.to_string()).await?;
    Ok(User::new(username.into(), email.into(), hash, role))
}

fn sample_books() -> Vec<Book> {
    SAMPLE_BOOKS
        .iter()
        .enumerate()
        .map(|(i, (title, author, genre, description))| {
            let step = i as i64;
            BookDraft {
                title: (*title).into(),
                author: (*author).into(),
                genre: (*genre).into(),
                isbn: format!("978-0-123456-7{:02}", i + 1),
                price: Decimal::new((10 + step * 2) * 100 + 99, 2),
                description: Some((*description).into()),
                stock: Some(50 + (i as i32) * 10),
                image_url: Some(COVER.into()),
            }
            .into_book()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sample_catalog_is_valid_and_unique() {
        let books = sample_books();
        assert_eq!(books.len(), 12);
        assert_eq!(books[0].price, dec!(10.99));
        assert_eq!(books[11].price, dec!(32.99));
        assert_eq!(books[11].stock, 160);
        assert_eq!(books[0].isbn, "978-0-123456-701");

        let mut isbns: Vec<_> = books.iter().map(|b| b.isbn.as_str()).collect();
        isbns.sort_unstable();
        isbns.dedup();
        assert_eq!(isbns.len(), 12);
    }
}
