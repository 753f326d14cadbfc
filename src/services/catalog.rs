use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogMovie, CatalogPage},
};

/// External movie catalog, queried by movie identifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Movies the catalog recommends alongside the given one
    async fn recommendations_for(&self, movie_id: &str) -> AppResult<Vec<CatalogMovie>>;
}

/// TMDB-backed catalog client.
///
/// One synchronous outbound call per lookup with fixed locale/page
/// parameters; transport defaults apply, nothing is retried.
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }
}

#[async_trait]
impl Catalog for TmdbCatalog {
    async fn recommendations_for(&self, movie_id: &str) -> AppResult<Vec<CatalogMovie>> {
        let url = format!("{}/movie/{}/recommendations", self.api_url, movie_id);

        tracing::debug!(movie_id = %movie_id, "Fetching recommendations from catalog");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                movie_id = %movie_id,
                status = %status,
                body = %body,
                "Catalog request failed"
            );
            let detail = serde_json::from_str::<Value>(&body).ok();
            return Err(AppError::Catalog {
                message: format!("Catalog returned status {}: {}", status, body),
                detail,
            });
        }

        let page: CatalogPage = response.json().await?;

        tracing::info!(
            movie_id = %movie_id,
            result_count = page.results.len(),
            "Fetched recommendations from catalog"
        );

        Ok(page.results)
    }
}
