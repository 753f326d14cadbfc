use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    db::{PgReviewStore, PgUserStore, ReviewStore, UserStore},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        auth::AuthService,
        catalog::{Catalog, TmdbCatalog},
        lists::ListService,
        recommendations::RecommendationService,
        reviews::ReviewService,
    },
};

pub mod auth;
pub mod recommendations;
pub mod reviews;
pub mod users;

/// Shared application state: each service behind its trait seams, wired
/// once at startup and injected into handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub lists: ListService,
    pub reviews: ReviewService,
    pub recommendations: RecommendationService,
}

impl AppState {
    /// Production wiring: Postgres-backed stores and the TMDB catalog
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let reviews: Arc<dyn ReviewStore> = Arc::new(PgReviewStore::new(pool));
        let catalog: Arc<dyn Catalog> = Arc::new(TmdbCatalog::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        ));

        Self::with_stores(users, reviews, catalog)
    }

    /// Wiring seam for tests and alternative backends
    pub fn with_stores(
        users: Arc<dyn UserStore>,
        reviews: Arc<dyn ReviewStore>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone()),
            lists: ListService::new(users.clone()),
            reviews: ReviewService::new(reviews),
            recommendations: RecommendationService::new(users, catalog),
        }
    }
}

/// Creates the main API router with all routes
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Profile and per-user movie lists
        .route("/profile", get(users::profile))
        .route("/favorites", get(users::favorites).post(users::add_favorite))
        .route("/favorites/:movie_id", delete(users::remove_favorite))
        .route(
            "/watchlist",
            get(users::watchlist).post(users::add_to_watchlist),
        )
        .route("/watchlist/:movie_id", delete(users::remove_from_watchlist))
        .route("/ratings", post(users::rate))
        .route("/viewed", post(users::record_view))
        // Reviews; /reviews/:movie_id is the public listing
        .route("/review", post(reviews::submit))
        .route("/reviews", get(reviews::list_mine))
        .route("/reviews/:movie_id", get(reviews::list_for_movie))
        .route("/review/:id", put(reviews::update).delete(reviews::remove))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
