use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{auth::AuthUser, AppState};
use crate::{
    error::AppResult,
    models::{MovieReview, NewReview, Review},
};

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub movie_id: String,
    pub movie_title: String,
    pub review_text: String,
    pub star_rating: i16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub review_text: String,
    pub star_rating: i16,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub message: String,
    pub review: Review,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// Handlers

/// Create a review for one movie; one per (user, movie)
pub async fn submit(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubmitReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let review = state
        .reviews
        .submit(NewReview {
            user_id: user.id,
            movie_id: request.movie_id,
            movie_title: request.movie_title,
            review_text: request.review_text,
            star_rating: request.star_rating,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            message: "Review submitted successfully.".to_string(),
            review,
        }),
    ))
}

/// The caller's reviews, newest first
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.reviews.list_mine(user.id).await?))
}

/// All reviews for a movie, newest first, with reviewer names. Public.
pub async fn list_for_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Vec<MovieReview>>> {
    Ok(Json(state.reviews.list_for_movie(&movie_id).await?))
}

/// Update an owned review's text and rating
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReviewRequest>,
) -> AppResult<Json<ReviewResponse>> {
    let review = state
        .reviews
        .update(user.id, id, &request.review_text, request.star_rating)
        .await?;

    Ok(Json(ReviewResponse {
        message: "Review updated successfully".to_string(),
        review,
    }))
}

/// Delete an owned review
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.reviews.remove(user.id, id).await?;

    Ok(Json(MessageResponse {
        message: "Review deleted successfully".to_string(),
    }))
}
