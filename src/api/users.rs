use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{auth::AuthUser, AppState};
use crate::{
    error::AppResult,
    models::{FavoriteEntry, RatedEntry, Review, User, ViewedEntry, WatchlistEntry},
};

// Request/Response types

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub favorites: Vec<FavoriteEntry>,
    pub watchlist: Vec<WatchlistEntry>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub message: String,
    pub favorites: Vec<FavoriteEntry>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub message: String,
    pub watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingsResponse {
    pub message: String,
    pub rated_movies: Vec<RatedEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub movie_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedResponse {
    pub message: String,
    pub recently_viewed: Vec<ViewedEntry>,
}

// Handlers

/// User summary with favorites, watchlist and own reviews
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let favorites = state.lists.favorites(user.id).await?;
    let watchlist = state.lists.watchlist(user.id).await?;
    let reviews = state.reviews.list_mine(user.id).await?;

    Ok(Json(ProfileResponse {
        user,
        favorites,
        watchlist,
        reviews,
    }))
}

pub async fn favorites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<FavoriteEntry>>> {
    Ok(Json(state.lists.favorites(user.id).await?))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(entry): Json<FavoriteEntry>,
) -> AppResult<(StatusCode, Json<FavoritesResponse>)> {
    let favorites = state.lists.add_favorite(user.id, entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(FavoritesResponse {
            message: "Added to favorites".to_string(),
            favorites,
        }),
    ))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(movie_id): Path<String>,
) -> AppResult<Json<FavoritesResponse>> {
    let favorites = state.lists.remove_favorite(user.id, &movie_id).await?;

    Ok(Json(FavoritesResponse {
        message: "Removed from favorites".to_string(),
        favorites,
    }))
}

pub async fn watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    Ok(Json(state.lists.watchlist(user.id).await?))
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(entry): Json<WatchlistEntry>,
) -> AppResult<(StatusCode, Json<WatchlistResponse>)> {
    let watchlist = state.lists.add_to_watchlist(user.id, entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(WatchlistResponse {
            message: "Added to watchlist".to_string(),
            watchlist,
        }),
    ))
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(movie_id): Path<String>,
) -> AppResult<Json<WatchlistResponse>> {
    let watchlist = state.lists.remove_from_watchlist(user.id, &movie_id).await?;

    Ok(Json(WatchlistResponse {
        message: "Removed from watchlist".to_string(),
        watchlist,
    }))
}

/// Upsert the caller's rating for one movie
pub async fn rate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(entry): Json<RatedEntry>,
) -> AppResult<(StatusCode, Json<RatingsResponse>)> {
    let rated_movies = state.lists.rate(user.id, entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(RatingsResponse {
            message: "Rating saved".to_string(),
            rated_movies,
        }),
    ))
}

/// Record that the caller viewed a movie just now
pub async fn record_view(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<RecordViewRequest>,
) -> AppResult<(StatusCode, Json<ViewedResponse>)> {
    let recently_viewed = state
        .lists
        .record_view(user.id, &request.movie_id, &request.title)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ViewedResponse {
            message: "View recorded".to_string(),
            recently_viewed,
        }),
    ))
}
