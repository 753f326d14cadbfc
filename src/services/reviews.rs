use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::ReviewStore,
    error::{AppError, AppResult},
    models::{MovieReview, NewReview, Review},
};

const NOT_FOUND_OR_UNAUTHORIZED: &str = "Review not found or unauthorized";

/// Review CRUD: one review per (user, movie), mutations restricted to the
/// owning user
#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewStore>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewStore>) -> Self {
        Self { reviews }
    }

    /// Creates a review. Rating and text are validated before anything is
    /// persisted; a second review for the same movie by the same user is
    /// rejected.
    pub async fn submit(&self, new_review: NewReview) -> AppResult<Review> {
        if new_review.movie_id.trim().is_empty() {
            return Err(AppError::InvalidInput("movieId is required".to_string()));
        }
        if new_review.movie_title.trim().is_empty() {
            return Err(AppError::InvalidInput("movieTitle is required".to_string()));
        }
        validate_review_fields(&new_review.review_text, new_review.star_rating)?;

        match self.reviews.insert(new_review).await? {
            Some(review) => Ok(review),
            None => Err(AppError::Duplicate(
                "You have already reviewed this movie.".to_string(),
            )),
        }
    }

    /// The caller's reviews, newest first
    pub async fn list_mine(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        self.reviews.list_by_user(user_id).await
    }

    /// All reviews for one movie with reviewer names, newest first. Public.
    pub async fn list_for_movie(&self, movie_id: &str) -> AppResult<Vec<MovieReview>> {
        self.reviews.list_for_movie(movie_id).await
    }

    /// Overwrites text and rating of an owned review
    pub async fn update(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        review_text: &str,
        star_rating: i16,
    ) -> AppResult<Review> {
        validate_review_fields(review_text, star_rating)?;

        self.reviews
            .update_owned(review_id, user_id, review_text, star_rating)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()))
    }

    /// Deletes an owned review
    pub async fn remove(&self, user_id: Uuid, review_id: Uuid) -> AppResult<()> {
        if !self.reviews.delete_owned(review_id, user_id).await? {
            return Err(AppError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.to_string()));
        }
        Ok(())
    }
}

fn validate_review_fields(review_text: &str, star_rating: i16) -> AppResult<()> {
    if review_text.trim().is_empty() {
        return Err(AppError::InvalidInput("reviewText is required".to_string()));
    }
    if !(1..=5).contains(&star_rating) {
        return Err(AppError::InvalidInput(
            "Star rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reviews::MockReviewStore;
    use chrono::Utc;

    fn submission(user_id: Uuid, star_rating: i16) -> NewReview {
        NewReview {
            user_id,
            movie_id: "603".to_string(),
            movie_title: "The Matrix".to_string(),
            review_text: "Mind-bending".to_string(),
            star_rating,
        }
    }

    fn stored(new_review: &NewReview) -> Review {
        Review {
            id: Uuid::new_v4(),
            user_id: new_review.user_id,
            movie_id: new_review.movie_id.clone(),
            movie_title: new_review.movie_title.clone(),
            review_text: new_review.review_text.clone(),
            star_rating: new_review.star_rating,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_created_review_with_id() {
        let user_id = Uuid::new_v4();

        let mut store = MockReviewStore::new();
        store
            .expect_insert()
            .returning(|new_review| Ok(Some(stored(&new_review))));

        let service = ReviewService::new(Arc::new(store));
        let review = service.submit(submission(user_id, 5)).await.unwrap();

        assert_eq!(review.user_id, user_id);
        assert_eq!(review.star_rating, 5);
        assert!(!review.id.is_nil());
    }

    #[tokio::test]
    async fn test_submit_twice_is_already_reviewed() {
        let mut store = MockReviewStore::new();
        store.expect_insert().returning(|_| Ok(None));

        let service = ReviewService::new(Arc::new(store));
        let result = service.submit(submission(Uuid::new_v4(), 4)).await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_rating_rejected_before_persistence() {
        let mut store = MockReviewStore::new();
        store.expect_insert().times(0);

        let service = ReviewService::new(Arc::new(store));

        for star_rating in [0, 6, -1] {
            let result = service.submit(submission(Uuid::new_v4(), star_rating)).await;
            assert!(matches!(result, Err(AppError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn test_update_foreign_review_is_not_found() {
        let mut store = MockReviewStore::new();
        store
            .expect_update_owned()
            .returning(|_, _, _, _| Ok(None));

        let service = ReviewService::new(Arc::new(store));
        let result = service
            .update(Uuid::new_v4(), Uuid::new_v4(), "still great", 4)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_foreign_review_is_not_found() {
        let mut store = MockReviewStore::new();
        store.expect_delete_owned().returning(|_, _| Ok(false));

        let service = ReviewService::new(Arc::new(store));
        let result = service.remove(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
