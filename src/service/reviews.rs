use uuid::Uuid;

use crate::auth::Caller;
use crate::error::{AppError, AppResult};
use crate::models::{CreateReviewRequest, RatingSummary, Review, ReviewView, UpdateReviewRequest};
use crate::repository::{BookRepository, ReviewRepository, UserRepository};
use crate::service::settle;
use crate::{PostgresUnitOfWork, UnitOfWork, UnitOfWorkSession};

/// Review writes plus the per-book rating aggregates.
///
/// A user holds at most one review per book. Only the author may edit a
/// review; the author or an administrator may delete it.
#[derive(Clone)]
pub struct Reviews {
    uow: PostgresUnitOfWork,
}

impl Reviews {
    pub fn new(uow: PostgresUnitOfWork) -> Self {
        Self { uow }
    }

    /// Newest first.
    pub async fn for_book(&self, book_id: Uuid) -> AppResult<Vec<ReviewView>> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let executor = session.executor();
            if BookRepository::new(executor.clone())
                .find_by_id(book_id)
                .await?
                .is_none()
            {
                return Err(book_not_found(book_id));
            }
            Ok(ReviewRepository::new(executor.clone())
                .list_for_book(book_id)
                .await?)
        }
        .await;
        settle(session, outcome).await
    }

    pub async fn rating_summary(&self, book_id: Uuid) -> AppResult<RatingSummary> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let reviews = ReviewRepository::new(session.executor().clone());
            Ok(RatingSummary {
                average_rating: reviews.average_rating(book_id).await?,
                total_reviews: reviews.review_count(book_id).await?,
            })
        }
        .await;
        settle(session, outcome).await
    }

    pub async fn create(&self, caller: &Caller, request: CreateReviewRequest) -> AppResult<ReviewView> {
        request.validate()?;

        let session = self.uow.begin().await?;
        let outcome = async {
            let executor = session.executor();
            let author = UserRepository::new(executor.clone())
                .find_by_id(caller.user_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User not found: {}", caller.username)))?;
            if BookRepository::new(executor.clone())
                .find_by_id(request.book_id)
                .await?
                .is_none()
            {
                return Err(book_not_found(request.book_id));
            }

            let reviews = ReviewRepository::new(executor.clone());
            if reviews.exists_for(author.id, request.book_id).await? {
                return Err(AppError::conflict("You have already reviewed this book"));
            }
            let review = Review::new(author.id, request.book_id, request.rating, clean(request.comment));
            reviews.insert(&review).await?;
            Ok(ReviewView {
                review,
                username: author.username,
            })
        }
        .await;
        let view = settle(session, outcome).await?;
        tracing::info!(review_id = %view.review.id, book_id = %view.review.book_id, rating = view.review.rating, "review created");
        Ok(view)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        request: UpdateReviewRequest,
    ) -> AppResult<ReviewView> {
        request.validate()?;

        let session = self.uow.begin().await?;
        let outcome = async {
            let reviews = ReviewRepository::new(session.executor().clone());
            let mut review = reviews
                .find_by_id(id)
                .await?
                .ok_or_else(|| review_not_found(id))?;
            if !caller.owns(review.user_id) {
                return Err(AppError::access_denied("You can only update your own reviews"));
            }
            review.revise(request.rating, clean(request.comment));
            reviews.update(&review).await?;
            reviews.find_view(id).await?.ok_or_else(|| review_not_found(id))
        }
        .await;
        settle(session, outcome).await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> AppResult<()> {
        let session = self.uow.begin().await?;
        let outcome = async {
            let reviews = ReviewRepository::new(session.executor().clone());
            let review = reviews
                .find_by_id(id)
                .await?
                .ok_or_else(|| review_not_found(id))?;
            if !caller.owns_or_admin(review.user_id) {
                return Err(AppError::access_denied("Access denied"));
            }
            reviews.delete(id).await?;
            Ok(())
        }
        .await;
        settle(session, outcome).await?;
        tracing::info!(review_id = %id, by = %caller.username, "review deleted");
        Ok(())
    }
}

fn clean(comment: Option<String>) -> Option<String> {
    comment
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn review_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Review not found with id: {id}"))
}

fn book_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Book not found with id: {id}"))
}

#[cfg(test)]
mod tests {
    use super::clean;

    #[test]
    fn blank_comments_are_dropped() {
        assert_eq!(clean(Some("   ".into())), None);
        assert_eq!(clean(None), None);
        assert_eq!(clean(Some(" Loved it ".into())), Some("Loved it".into()));
    }
}
