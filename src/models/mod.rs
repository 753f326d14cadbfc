use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// A user account as returned to clients. The password hash never leaves
/// the store layer in this shape.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new account; credential fields are already
/// processed (hashed password, minted token)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub api_token: String,
}

/// Full account row including credentials, for login verification
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub api_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserCredentials> for User {
    fn from(record: UserCredentials) -> Self {
        User {
            id: record.id,
            username: record.username,
            email: record.email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ============================================================================
// Per-user movie lists
// ============================================================================

/// One favorited movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub movie_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// One watchlisted movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A movie the user has rated; the recommendation seed falls back to the
/// first of these when there are no favorites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RatedEntry {
    pub movie_id: String,
    pub title: String,
    pub rating: f32,
}

/// A recently viewed movie, newest first
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ViewedEntry {
    pub movie_id: String,
    pub title: String,
    pub viewed_at: DateTime<Utc>,
}

// ============================================================================
// Reviews
// ============================================================================

/// A user's review of one movie. One review per (user, movie).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: String,
    pub movie_title: String,
    pub review_text: String,
    pub star_rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a review, validated by the review service
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub movie_id: String,
    pub movie_title: String,
    pub review_text: String,
    pub star_rating: i16,
}

/// A review in the public per-movie listing, augmented with the reviewer's
/// display name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MovieReview {
    pub id: Uuid,
    pub username: String,
    pub movie_id: String,
    pub movie_title: String,
    pub review_text: String,
    pub star_rating: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Catalog API types
// ============================================================================

/// One movie as the catalog describes it. Field names are the catalog's
/// own; the recommendations endpoint passes these through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub adult: bool,
}

/// Raw response page from GET /movie/{id}/recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<CatalogMovie>,
}

/// Recommendation result: either a list seeded from the reference movie or
/// an explanatory empty state (still a success)
#[derive(Debug, Serialize)]
pub struct Recommendations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub recommended: Vec<CatalogMovie>,
}

impl Recommendations {
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            recommended: Vec::new(),
        }
    }

    pub fn seeded(recommended: Vec<CatalogMovie>) -> Self {
        Self {
            message: None,
            recommended,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_entry_uses_camel_case_on_the_wire() {
        let entry: FavoriteEntry = serde_json::from_str(
            r#"{"movieId":"603","title":"The Matrix","posterPath":"/matrix.jpg"}"#,
        )
        .unwrap();
        assert_eq!(entry.movie_id, "603");
        assert_eq!(entry.poster_path.as_deref(), Some("/matrix.jpg"));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["movieId"], "603");
        assert_eq!(json["posterPath"], "/matrix.jpg");
    }

    #[test]
    fn test_watchlist_entry_optional_fields_default() {
        let entry: WatchlistEntry =
            serde_json::from_str(r#"{"movieId":"27205","title":"Inception"}"#).unwrap();
        assert_eq!(entry.poster_path, None);
        assert_eq!(entry.genre, None);
        assert_eq!(entry.release_date, None);
    }

    #[test]
    fn test_catalog_page_parses_tmdb_payload() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 27205,
                    "title": "Inception",
                    "overview": "A thief who steals corporate secrets",
                    "poster_path": "/inception.jpg",
                    "release_date": "2010-07-15",
                    "genre_ids": [28, 878],
                    "vote_average": 8.4,
                    "vote_count": 34000,
                    "popularity": 90.2
                },
                {
                    "id": 157336,
                    "title": "Interstellar",
                    "poster_path": null
                }
            ],
            "total_pages": 5,
            "total_results": 100
        }"#;

        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].id, 27205);
        assert_eq!(page.results[0].genre_ids, vec![28, 878]);
        assert_eq!(page.results[1].poster_path, None);
        assert_eq!(page.results[1].vote_count, 0);
    }

    #[test]
    fn test_review_serializes_camel_case() {
        let review = Review {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            movie_id: "603".into(),
            movie_title: "The Matrix".into(),
            review_text: "Mind-bending".into(),
            star_rating: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["movieId"], "603");
        assert_eq!(json["starRating"], 5);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("review_text").is_none());
    }

    #[test]
    fn test_empty_recommendations_keep_message() {
        let recs = Recommendations::empty("Add some favorite or rated movies");
        let json = serde_json::to_value(&recs).unwrap();
        assert_eq!(json["recommended"].as_array().unwrap().len(), 0);
        assert!(json["message"].is_string());

        let seeded = Recommendations::seeded(Vec::new());
        let json = serde_json::to_value(&seeded).unwrap();
        assert!(json.get("message").is_none());
    }
}
