//! Marketplace taxonomy scraping.

pub mod extract;
pub mod http_client;
pub mod slug;

use async_trait::async_trait;
use tracing::info;

use crate::models::CategoryMap;

pub use http_client::{FetchError, HttpClient, USER_AGENT};
pub use slug::slugify;

/// Source of live taxonomy data.
///
/// The cache layer depends on this seam rather than on the scraper directly,
/// so tests can substitute a canned source.
#[async_trait]
pub trait CategorySource: Send + Sync {
    /// Fetch all top-level categories from the taxonomy root page.
    async fn fetch_categories(&self) -> Result<CategoryMap, FetchError>;

    /// Fetch the subcategories listed on one parent category's page.
    async fn fetch_subcategories(
        &self,
        parent_id: &str,
        parent_label: &str,
    ) -> Result<CategoryMap, FetchError>;
}

/// Best-effort scraper for the marketplace category taxonomy.
pub struct TaxonomyScraper {
    client: HttpClient,
    base_url: String,
}

impl TaxonomyScraper {
    /// Create a scraper against a marketplace base URL.
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// URL of the taxonomy root page.
    pub fn root_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// URL of one parent category's page, built from its id and slugified
    /// label.
    pub fn category_url(&self, parent_id: &str, parent_label: &str) -> String {
        format!(
            "{}/c/{}/{}/",
            self.base_url,
            slugify(parent_label),
            parent_id
        )
    }
}

#[async_trait]
impl CategorySource for TaxonomyScraper {
    async fn fetch_categories(&self) -> Result<CategoryMap, FetchError> {
        let html = self.client.get_text(&self.root_url()).await?;
        let categories = extract::extract_categories(&html);
        info!(
            "Fetched {} categories from {}",
            categories.len(),
            self.base_url
        );
        Ok(categories)
    }

    async fn fetch_subcategories(
        &self,
        parent_id: &str,
        parent_label: &str,
    ) -> Result<CategoryMap, FetchError> {
        let url = self.category_url(parent_id, parent_label);
        let html = self.client.get_text(&url).await?;
        let subcategories = extract::extract_subcategories(&html, parent_id, parent_label);
        info!(
            "Fetched {} subcategories for category {}",
            subcategories.len(),
            parent_id
        );
        Ok(subcategories)
    }
}
