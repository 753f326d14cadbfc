use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        FavoriteEntry, NewUser, RatedEntry, User, UserCredentials, ViewedEntry, WatchlistEntry,
    },
};

/// Typed access to user accounts and their per-user movie lists.
///
/// Each list mutation is a single atomic statement keyed on
/// `(user_id, movie_id)`; there is no read-modify-write of a user
/// aggregate, so concurrent mutations to different lists cannot clobber
/// each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account. Unique violations on username/email surface
    /// as `AppError::Duplicate` with a field-specific message.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Full credentials row for login verification
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>>;

    /// Resolves a bearer token to its account, if any
    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>>;

    async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteEntry>>;

    /// Returns false when the movie is already in the list
    async fn add_favorite(&self, user_id: Uuid, entry: FavoriteEntry) -> AppResult<bool>;

    /// Idempotent; removing an absent movie is a no-op
    async fn remove_favorite(&self, user_id: Uuid, movie_id: &str) -> AppResult<()>;

    async fn watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>>;

    async fn add_to_watchlist(&self, user_id: Uuid, entry: WatchlistEntry) -> AppResult<bool>;

    async fn remove_from_watchlist(&self, user_id: Uuid, movie_id: &str) -> AppResult<()>;

    async fn rated_movies(&self, user_id: Uuid) -> AppResult<Vec<RatedEntry>>;

    /// Inserts or updates the rating for one movie, keeping the original
    /// list position on update
    async fn upsert_rating(&self, user_id: Uuid, entry: RatedEntry) -> AppResult<()>;

    async fn recently_viewed(&self, user_id: Uuid) -> AppResult<Vec<ViewedEntry>>;

    /// Records a view, refreshing `viewed_at` when the movie was already
    /// in the list
    async fn record_view(&self, user_id: Uuid, movie_id: &str, title: &str) -> AppResult<()>;
}

/// Postgres-backed implementation of [`UserStore`]
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, email, created_at, updated_at";

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, password_hash, api_token)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, username, email, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.api_token)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                let message = match e.constraint() {
                    Some("users_username_key") => "Username already taken",
                    Some("users_email_key") => "Email already registered",
                    _ => "Account already exists",
                };
                Err(AppError::Duplicate(message.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let record = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, username, email, password_hash, api_token, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE api_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<FavoriteEntry>> {
        let entries = sqlx::query_as::<_, FavoriteEntry>(
            "SELECT movie_id, title, poster_path
             FROM favorites WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn add_favorite(&self, user_id: Uuid, entry: FavoriteEntry) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, movie_id, title, poster_path)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, movie_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(&entry.movie_id)
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, user_id: Uuid, movie_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            "SELECT movie_id, title, poster_path, genre, release_date
             FROM watchlist_items WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn add_to_watchlist(&self, user_id: Uuid, entry: WatchlistEntry) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO watchlist_items (user_id, movie_id, title, poster_path, genre, release_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, movie_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(&entry.movie_id)
        .bind(&entry.title)
        .bind(&entry.poster_path)
        .bind(&entry.genre)
        .bind(&entry.release_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_watchlist(&self, user_id: Uuid, movie_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM watchlist_items WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn rated_movies(&self, user_id: Uuid) -> AppResult<Vec<RatedEntry>> {
        let entries = sqlx::query_as::<_, RatedEntry>(
            "SELECT movie_id, title, rating
             FROM rated_movies WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn upsert_rating(&self, user_id: Uuid, entry: RatedEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO rated_movies (user_id, movie_id, title, rating)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET rating = EXCLUDED.rating",
        )
        .bind(user_id)
        .bind(&entry.movie_id)
        .bind(&entry.title)
        .bind(entry.rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recently_viewed(&self, user_id: Uuid) -> AppResult<Vec<ViewedEntry>> {
        let entries = sqlx::query_as::<_, ViewedEntry>(
            "SELECT movie_id, title, viewed_at
             FROM recently_viewed WHERE user_id = $1 ORDER BY viewed_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn record_view(&self, user_id: Uuid, movie_id: &str, title: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO recently_viewed (user_id, movie_id, title)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET viewed_at = now()",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(title)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
