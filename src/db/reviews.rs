use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{MovieReview, NewReview, Review},
};

/// Typed access to the reviews collection. One review per (user, movie),
/// enforced by a UNIQUE index; timestamps are maintained here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Inserts a review. Returns `None` when the (user, movie) pair is
    /// already reviewed, letting the service raise the domain error.
    async fn insert(&self, new_review: NewReview) -> AppResult<Option<Review>>;

    /// All reviews by one user, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>>;

    /// All reviews for one movie with reviewer names, newest first
    async fn list_for_movie(&self, movie_id: &str) -> AppResult<Vec<MovieReview>>;

    /// Overwrites text and rating of a review owned by `user_id`; `None`
    /// when no such review exists or it belongs to someone else
    async fn update_owned(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        review_text: &str,
        star_rating: i16,
    ) -> AppResult<Option<Review>>;

    /// Returns false when no review with that id is owned by `user_id`
    async fn delete_owned(&self, review_id: Uuid, user_id: Uuid) -> AppResult<bool>;
}

/// Postgres-backed implementation of [`ReviewStore`]
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REVIEW_COLUMNS: &str =
    "id, user_id, movie_id, movie_title, review_text, star_rating, created_at, updated_at";

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn insert(&self, new_review: NewReview) -> AppResult<Option<Review>> {
        let result = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (id, user_id, movie_id, movie_title, review_text, star_rating)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new_review.user_id)
        .bind(&new_review.movie_id)
        .bind(&new_review.movie_title)
        .bind(&new_review.review_text)
        .bind(new_review.star_rating)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(review) => Ok(Some(review)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn list_for_movie(&self, movie_id: &str) -> AppResult<Vec<MovieReview>> {
        let reviews = sqlx::query_as::<_, MovieReview>(
            "SELECT r.id, u.username, r.movie_id, r.movie_title, r.review_text,
                    r.star_rating, r.created_at, r.updated_at
             FROM reviews r
             JOIN users u ON u.id = r.user_id
             WHERE r.movie_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn update_owned(
        &self,
        review_id: Uuid,
        user_id: Uuid,
        review_text: &str,
        star_rating: i16,
    ) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews
             SET review_text = $1, star_rating = $2, updated_at = now()
             WHERE id = $3 AND user_id = $4
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review_text)
        .bind(star_rating)
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn delete_owned(&self, review_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
