mod common;

use bookstore_backend::models::{BookQuery, CreateReviewRequest, Role, UpdateReviewRequest};
use bookstore_backend::service::{Catalog, Reviews};
use bookstore_backend::AppError;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{create_book, create_user, setup_database, unit_of_work};

fn review(book_id: Uuid, rating: i32) -> CreateReviewRequest {
    CreateReviewRequest {
        book_id,
        rating,
        comment: Some("Worth reading".to_string()),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL; run: cargo test -- --include-ignored"]
async fn one_review_per_user_and_book() {
    let pool = setup_database().await;
    let uow = unit_of_work(&pool);
    let reviews = Reviews::new(uow.clone());

    let reader = create_user(&uow, "reader", Role::Customer).await;
    let book = create_book(&uow, "Middlemarch", dec!(11.00), 3).await;

    let first = reviews
        .create(&reader, review(book.id, 4))
        .await
        .expect("first review is accepted");
    assert_eq!(first.username, "reader");

    let err = reviews
        .create(&reader, review(book.id, 5))
        .await
        .expect_err("second review must fail");
    assert!(matches!(err, AppError::Conflict(ref msg) if msg == "You have already reviewed this book"));

    reviews
        .delete(&reader, first.review.id)
        .await
        .expect("author may delete");
    reviews
        .create(&reader, review(book.id, 5))
        .await
        .expect("review may be written again after deletion");

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL; run: cargo test -- --include-ignored"]
async fn only_the_author_edits_and_admins_may_delete() {
    let pool = setup_database().await;
    let uow = unit_of_work(&pool);
    let reviews = Reviews::new(uow.clone());

    let author = create_user(&uow, "author", Role::Customer).await;
    let other = create_user(&uow, "other", Role::Customer).await;
    let admin = create_user(&uow, "admin", Role::Admin).await;
    let book = create_book(&uow, "Persuasion", dec!(8.00), 3).await;

    let created = reviews
        .create(&author, review(book.id, 2))
        .await
        .expect("review is accepted");
    let id = created.review.id;

    let update = || UpdateReviewRequest {
        rating: 5,
        comment: Some("Better on a second read".to_string()),
    };

    let err = reviews.update(&other, id, update()).await.expect_err("not the author");
    assert!(matches!(err, AppError::AccessDenied(_)));
    let err = reviews.update(&admin, id, update()).await.expect_err("admins do not edit");
    assert!(matches!(err, AppError::AccessDenied(_)));

    let updated = reviews.update(&author, id, update()).await.expect("author edits");
    assert_eq!(updated.review.rating, 5);
    assert!(updated.review.updated_at >= created.review.updated_at);

    let err = reviews.delete(&other, id).await.expect_err("not the author");
    assert!(matches!(err, AppError::AccessDenied(_)));
    reviews.delete(&admin, id).await.expect("admin override");

    let err = reviews.delete(&admin, id).await.expect_err("already gone");
    assert!(matches!(err, AppError::NotFound(_)));

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL; run: cargo test -- --include-ignored"]
async fn ratings_are_aggregated_at_read_time() {
    let pool = setup_database().await;
    let uow = unit_of_work(&pool);
    let reviews = Reviews::new(uow.clone());
    let catalog = Catalog::new(uow.clone());

    let book = create_book(&uow, "Dracula", dec!(6.50), 2).await;
    let quiet = create_book(&uow, "Quiet Book", dec!(6.50), 0).await;
    for (name, rating) in [("ann", 5), ("bob", 4), ("cy", 3)] {
        let user = create_user(&uow, name, Role::Customer).await;
        reviews
            .create(&user, review(book.id, rating))
            .await
            .expect("review is accepted");
    }

    let summary = reviews.rating_summary(book.id).await.expect("summary");
    assert_eq!(summary.total_reviews, 3);
    assert!((summary.average_rating - 4.0).abs() < f64::EPSILON);

    let unreviewed = reviews.rating_summary(quiet.id).await.expect("summary");
    assert_eq!(unreviewed.total_reviews, 0);
    assert_eq!(unreviewed.average_rating, 0.0);

    let view = catalog.get(book.id).await.expect("book view");
    assert_eq!(view.rating.total_reviews, 3);

    let listed = reviews.for_book(book.id).await.expect("reviews");
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].username, "cy", "newest first");

    // Listing carries the same aggregates; inStock hides the empty book
    let in_stock = catalog
        .list(&BookQuery {
            search: None,
            genre: None,
            in_stock: true,
        })
        .await
        .expect("list");
    assert_eq!(in_stock.len(), 1);
    assert_eq!(in_stock[0].rating.total_reviews, 3);

    let err = reviews.for_book(Uuid::new_v4()).await.expect_err("unknown book");
    assert!(matches!(err, AppError::NotFound(_)));

    pool.close().await;
}
