use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::Recommendations,
    services::catalog::Catalog,
};

const EMPTY_STATE_MESSAGE: &str = "Add some favorite or rated movies to get recommendations.";

/// Seeds a catalog lookup from the user's reference movie and passes the
/// result through untouched: no filtering, re-ranking or caching.
#[derive(Clone)]
pub struct RecommendationService {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn Catalog>,
}

impl RecommendationService {
    pub fn new(users: Arc<dyn UserStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { users, catalog }
    }

    /// Recommendations for one user. A user with nothing to seed from gets
    /// a non-error empty state; the catalog is not called.
    pub async fn for_user(&self, user_id: Uuid) -> AppResult<Recommendations> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        let Some(reference) = self.reference_movie(user_id).await? else {
            return Ok(Recommendations::empty(EMPTY_STATE_MESSAGE));
        };

        let recommended = self.catalog.recommendations_for(&reference).await?;
        Ok(Recommendations::seeded(recommended))
    }

    /// The reference movie: first favorite, else first rated movie
    async fn reference_movie(&self, user_id: Uuid) -> AppResult<Option<String>> {
        if let Some(favorite) = self.users.favorites(user_id).await?.into_iter().next() {
            return Ok(Some(favorite.movie_id));
        }

        Ok(self
            .users
            .rated_movies(user_id)
            .await?
            .into_iter()
            .next()
            .map(|rated| rated.movie_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::MockUserStore;
    use crate::models::{CatalogMovie, FavoriteEntry, RatedEntry, User};
    use crate::services::catalog::MockCatalog;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn known_user(user_id: Uuid) -> MockUserStore {
        let mut store = MockUserStore::new();
        store.expect_find_by_id().with(eq(user_id)).returning(|id| {
            Ok(Some(User {
                id,
                username: "frodo".to_string(),
                email: "frodo@shire.example".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });
        store
    }

    fn catalog_movie(id: i64, title: &str) -> CatalogMovie {
        CatalogMovie {
            id,
            title: title.to_string(),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            genre_ids: Vec::new(),
            original_language: None,
            original_title: None,
            popularity: 0.0,
            vote_average: 0.0,
            vote_count: 0,
            adult: false,
        }
    }

    #[tokio::test]
    async fn test_no_seed_returns_empty_state_without_catalog_call() {
        let user_id = Uuid::new_v4();

        let mut store = known_user(user_id);
        store.expect_favorites().returning(|_| Ok(Vec::new()));
        store.expect_rated_movies().returning(|_| Ok(Vec::new()));

        let mut catalog = MockCatalog::new();
        catalog.expect_recommendations_for().times(0);

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog));
        let result = service.for_user(user_id).await.unwrap();

        assert!(result.message.is_some());
        assert!(result.recommended.is_empty());
    }

    #[tokio::test]
    async fn test_first_favorite_seeds_catalog() {
        let user_id = Uuid::new_v4();

        let mut store = known_user(user_id);
        store.expect_favorites().returning(|_| {
            Ok(vec![
                FavoriteEntry {
                    movie_id: "603".to_string(),
                    title: "The Matrix".to_string(),
                    poster_path: None,
                },
                FavoriteEntry {
                    movie_id: "27205".to_string(),
                    title: "Inception".to_string(),
                    poster_path: None,
                },
            ])
        });

        let mut catalog = MockCatalog::new();
        catalog
            .expect_recommendations_for()
            .with(eq("603"))
            .returning(|_| Ok(vec![catalog_movie(604, "The Matrix Reloaded")]));

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog));
        let result = service.for_user(user_id).await.unwrap();

        assert!(result.message.is_none());
        assert_eq!(result.recommended, vec![catalog_movie(604, "The Matrix Reloaded")]);
    }

    #[tokio::test]
    async fn test_rated_movie_seeds_when_no_favorites() {
        let user_id = Uuid::new_v4();

        let mut store = known_user(user_id);
        store.expect_favorites().returning(|_| Ok(Vec::new()));
        store.expect_rated_movies().returning(|_| {
            Ok(vec![RatedEntry {
                movie_id: "157336".to_string(),
                title: "Interstellar".to_string(),
                rating: 5.0,
            }])
        });

        let mut catalog = MockCatalog::new();
        catalog
            .expect_recommendations_for()
            .with(eq("157336"))
            .returning(|_| Ok(Vec::new()));

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog));
        let result = service.for_user(user_id).await.unwrap();

        assert!(result.message.is_none());
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let user_id = Uuid::new_v4();

        let mut store = known_user(user_id);
        store.expect_favorites().returning(|_| {
            Ok(vec![FavoriteEntry {
                movie_id: "603".to_string(),
                title: "The Matrix".to_string(),
                poster_path: None,
            }])
        });

        let mut catalog = MockCatalog::new();
        catalog.expect_recommendations_for().returning(|_| {
            Err(AppError::Catalog {
                message: "status 500".to_string(),
                detail: None,
            })
        });

        let service = RecommendationService::new(Arc::new(store), Arc::new(catalog));
        let result = service.for_user(user_id).await;

        assert!(matches!(result, Err(AppError::Catalog { .. })));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let mut store = MockUserStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));

        let service =
            RecommendationService::new(Arc::new(store), Arc::new(MockCatalog::new()));
        let result = service.for_user(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
