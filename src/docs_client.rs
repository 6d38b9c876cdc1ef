//! HTTP client for the Agora documentation site.
//!
//! The site publishes a single link index (`llms.txt`) plus markdown mirrors
//! of every documentation page (`*.html.md`). Everything is fetched as plain
//! text; parsing happens in [`crate::catalog`] and [`crate::snippets`].

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::cache::IndexSource;

/// Production documentation host.
pub const DEFAULT_BASE_URL: &str = "https://docs.agora-ds.es";

/// Path of the link index below the base URL.
const INDEX_PATH: &str = "llms.txt";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Document not found: {0}")]
    NotFound(String),
}

/// Thin fetcher over the documentation site.
#[derive(Debug, Clone)]
pub struct DocsClient {
    client: Client,
    base_url: String,
}

impl DocsClient {
    pub fn new() -> Self {
        Self::new_with_base_url(DEFAULT_BASE_URL)
    }

    pub fn new_with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the raw link index document.
    pub async fn fetch_index(&self) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, INDEX_PATH);
        self.fetch_text(&url).await
    }

    /// Fetch a documentation page. Index rows usually carry absolute URLs,
    /// which are taken as-is; anything relative is resolved against the base.
    pub async fn fetch_page(&self, target: &str) -> Result<String, FetchError> {
        let url = match Url::parse(target) {
            Ok(absolute) => absolute.to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                format!("{}/{}", self.base_url, target.trim_start_matches('/'))
            }
            Err(err) => return Err(err.into()),
        };
        self.fetch_text(&url).await
    }

    /// Fetch a guideline page by its slug, e.g. `accesibilidad`.
    pub async fn fetch_guideline(&self, slug: &str) -> Result<String, FetchError> {
        let url = format!("{}/guia-{}.html.md", self.base_url, slug);
        self.fetch_text(&url).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("Fetching documentation from: {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "text/markdown, text/plain;q=0.9")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::NotFound(format!(
                "{} (HTTP {})",
                url,
                response.status().as_u16()
            )));
        }

        Ok(response.text().await?)
    }
}

impl Default for DocsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexSource for DocsClient {
    async fn fetch_index(&self) -> Result<String, FetchError> {
        DocsClient::fetch_index(self).await
    }
}
