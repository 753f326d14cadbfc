use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{FavoriteEntry, RatedEntry, ViewedEntry, WatchlistEntry},
};

/// Favorites, watchlist, ratings and recently-viewed, scoped to one
/// authenticated user. Every mutation returns the updated list.
#[derive(Clone)]
pub struct ListService {
    users: Arc<dyn UserStore>,
}

impl ListService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteEntry>> {
        self.users.favorites(user_id).await
    }

    pub async fn add_favorite(
        &self,
        user_id: Uuid,
        entry: FavoriteEntry,
    ) -> AppResult<Vec<FavoriteEntry>> {
        validate_movie(&entry.movie_id, &entry.title)?;

        if !self.users.add_favorite(user_id, entry).await? {
            return Err(AppError::Duplicate(
                "Movie already in favorites".to_string(),
            ));
        }

        self.users.favorites(user_id).await
    }

    /// Removal is forgiving: absent movie ids are a no-op success
    pub async fn remove_favorite(
        &self,
        user_id: Uuid,
        movie_id: &str,
    ) -> AppResult<Vec<FavoriteEntry>> {
        self.users.remove_favorite(user_id, movie_id).await?;
        self.users.favorites(user_id).await
    }

    pub async fn watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        self.users.watchlist(user_id).await
    }

    pub async fn add_to_watchlist(
        &self,
        user_id: Uuid,
        entry: WatchlistEntry,
    ) -> AppResult<Vec<WatchlistEntry>> {
        validate_movie(&entry.movie_id, &entry.title)?;

        if !self.users.add_to_watchlist(user_id, entry).await? {
            return Err(AppError::Duplicate(
                "Movie already in watchlist".to_string(),
            ));
        }

        self.users.watchlist(user_id).await
    }

    pub async fn remove_from_watchlist(
        &self,
        user_id: Uuid,
        movie_id: &str,
    ) -> AppResult<Vec<WatchlistEntry>> {
        self.users.remove_from_watchlist(user_id, movie_id).await?;
        self.users.watchlist(user_id).await
    }

    /// Upserts the rating; rating the same movie again keeps its original
    /// list position
    pub async fn rate(&self, user_id: Uuid, entry: RatedEntry) -> AppResult<Vec<RatedEntry>> {
        validate_movie(&entry.movie_id, &entry.title)?;

        self.users.upsert_rating(user_id, entry).await?;
        self.users.rated_movies(user_id).await
    }

    /// Records a view now; a repeated view refreshes its timestamp instead
    /// of duplicating the entry
    pub async fn record_view(
        &self,
        user_id: Uuid,
        movie_id: &str,
        title: &str,
    ) -> AppResult<Vec<ViewedEntry>> {
        validate_movie(movie_id, title)?;

        self.users.record_view(user_id, movie_id, title).await?;
        self.users.recently_viewed(user_id).await
    }
}

fn validate_movie(movie_id: &str, title: &str) -> AppResult<()> {
    if movie_id.trim().is_empty() {
        return Err(AppError::InvalidInput("movieId is required".to_string()));
    }
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    Ok(())
}
