//! Agora design system catalog MCP implementation.
//!
//! This module exposes the component catalog of the Agora design system as an
//! MCP tool box. Component names are accepted in Spanish or English, with or
//! without diacritics; code examples are extracted from the markdown mirrors
//! of the documentation pages.
//!
//! # Main Components
//!
//! - [`CatalogService`]: the tool box, holding the HTTP client and the
//!   catalog cache
//! - [`crate::catalog::Catalog`]: the parsed index document
//! - [`crate::cache::CatalogCache`]: TTL cache guarding the index fetch
//!
//! # Example
//! ```no_run
//! use agora_mcp::cache::DEFAULT_TTL;
//! use agora_mcp::docs_client::DEFAULT_BASE_URL;
//! use agora_mcp::mcp::CatalogService;
//!
//! let service = CatalogService::new(DEFAULT_BASE_URL, DEFAULT_TTL);
//! ```

use rmcp::model::{Implementation, ListPromptsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, Error as McpError, ServerHandler, model::ServerInfo, tool};
use rmcp::model::{Content, IntoContents};
use itertools::Itertools;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::CatalogCache;
use crate::catalog::{Capabilities, Catalog, Category, Component};
use crate::docs_client::{DocsClient, FetchError};
use crate::resolver::{self, MatchKind, Resolution};
use crate::snippets::{self, CodeFormat};

/// Hard cap on `search_components` results.
const MAX_SEARCH_RESULTS: usize = 100;
/// Close-match suggestions offered in a not-found message.
const MAX_SUGGESTIONS: usize = 5;
/// Known keys listed in a not-found message when no suggestion is close.
const MAX_LISTED_KEYS: usize = 15;

/// Failure at the tool boundary, rendered for the caller as a text payload.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Invalid(String),
}

/// Implements conversion from ServiceError to MCP Contents.
impl IntoContents for ServiceError {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::text(self.to_string())]
    }
}

/// Plain-text tool payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocText {
    pub content: String,
}

impl IntoContents for DocText {
    fn into_contents(self) -> Vec<Content> {
        vec![Content::text(self.content)]
    }
}

fn json_text<T: Serialize>(value: &T) -> Vec<Content> {
    let text = serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| format!(r#"{{"error":"serialization failed: {err}"}}"#));
    vec![Content::text(text)]
}

/// One search hit, with the catalog row's metadata and capability flags.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub name: String,
    pub key: String,
    pub category: String,
    pub url: String,
    pub capabilities: Capabilities,
    /// How the resolver arrived at this hit. Absent in browse mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
}

impl SearchMatch {
    fn from_component(component: &Component, match_kind: Option<MatchKind>) -> Self {
        Self {
            name: component.name.clone(),
            key: component.key.clone(),
            category: component.category.clone(),
            url: component.url.clone(),
            capabilities: component.capabilities,
            match_kind,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub total: usize,
    pub matches: Vec<SearchMatch>,
}

impl IntoContents for SearchResults {
    fn into_contents(self) -> Vec<Content> {
        json_text(&self)
    }
}

/// Component metadata plus the fetched properties page, when one exists.
#[derive(Debug, Clone, Serialize)]
pub struct PropsReport {
    pub component: String,
    pub key: String,
    pub category: String,
    pub url: String,
    /// Union of the flags across all catalog rows of the component.
    pub capabilities: Capabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl IntoContents for PropsReport {
    fn into_contents(self) -> Vec<Content> {
        json_text(&self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub description: String,
    pub components: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub categories: Vec<CategorySummary>,
}

impl IntoContents for CategoryListing {
    fn into_contents(self) -> Vec<Content> {
        json_text(&self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub status: &'static str,
    pub message: String,
}

impl IntoContents for RefreshStatus {
    fn into_contents(self) -> Vec<Content> {
        json_text(&self)
    }
}

/// Which code page and fence buffer a code tool targets.
#[derive(Debug, Clone, Copy)]
enum CodeTarget {
    Html,
    Nunjucks,
    Angular,
}

/// The MCP tool box serving catalog queries.
///
/// Holds the documentation-site client and the TTL-cached catalog; cloning is
/// cheap, so the SSE transport can mint one service per connection.
#[derive(Clone)]
pub struct CatalogService {
    client: Arc<DocsClient>,
    cache: Arc<CatalogCache>,
}

#[tool(tool_box)]
impl CatalogService {
    pub fn new(base_url: &str, ttl: Duration) -> Self {
        let client = Arc::new(DocsClient::new_with_base_url(base_url));
        let cache = Arc::new(CatalogCache::new(client.clone(), ttl));
        Self { client, cache }
    }

    async fn catalog(&self) -> Result<Arc<Catalog>, ServiceError> {
        Ok(self.cache.get(false).await?)
    }

    /// Shared path of the three code tools: resolve the name, pick the
    /// catalog row documenting the requested format, fetch and render.
    async fn component_code(
        &self,
        component: &str,
        variant: Option<&str>,
        target: CodeTarget,
    ) -> Result<DocText, ServiceError> {
        let query = component.trim();
        if query.is_empty() {
            return Err(ServiceError::Invalid(
                "The component argument must not be empty.".to_string(),
            ));
        }

        let catalog = self.catalog().await?;
        let Some(Resolution { key, kind }) = resolver::resolve(&catalog, query) else {
            return Err(ServiceError::NotFound(component_not_found(&catalog, query)));
        };
        tracing::debug!("Resolved '{}' to '{}' via {:?} match", query, key, kind);

        let rows = catalog.rows_for(&key);
        let resolved = catalog
            .get(&key)
            .ok_or_else(|| ServiceError::NotFound(component_not_found(&catalog, query)))?;

        let row = match target {
            CodeTarget::Html => rows
                .iter()
                .copied()
                .find(|c| c.capabilities.has_html_code)
                .unwrap_or(resolved),
            // No dedicated Nunjucks page means the macro fences live on the
            // markup page.
            CodeTarget::Nunjucks => rows
                .iter()
                .copied()
                .find(|c| c.capabilities.has_nunjucks_code)
                .or_else(|| rows.iter().copied().find(|c| c.capabilities.has_html_code))
                .unwrap_or(resolved),
            CodeTarget::Angular => match rows.iter().copied().find(|c| c.capabilities.has_angular_code) {
                Some(row) => row,
                None => {
                    return Ok(DocText {
                        content: angular_unavailable(resolved, &rows),
                    });
                }
            },
        };

        let page = self.client.fetch_page(&row.url).await?;
        let blocks = snippets::extract_examples(&page);
        let format = match target {
            CodeTarget::Nunjucks => CodeFormat::Nunjucks,
            // Angular pages document usage in plain markup fences.
            CodeTarget::Html | CodeTarget::Angular => CodeFormat::Html,
        };

        Ok(DocText {
            content: snippets::render_examples(&blocks, format, variant),
        })
    }

    #[tool(description = "Get HTML markup examples for a component of the Agora design system")]
    async fn get_component_code_html(
        &self,
        #[tool(param)]
        #[schemars(description = "Component name, in Spanish or English, e.g. 'botón' or 'button'")]
        component: String,

        #[tool(param)]
        #[schemars(description = "Optional variant to narrow the examples, e.g. 'primario'. All variants are returned when omitted or when nothing matches.")]
        variant: Option<String>,
    ) -> Result<DocText, ServiceError> {
        self.component_code(&component, variant.as_deref(), CodeTarget::Html)
            .await
    }

    #[tool(description = "Get Nunjucks macro examples for a component of the Agora design system")]
    async fn get_component_code_nunjucks(
        &self,
        #[tool(param)]
        #[schemars(description = "Component name, in Spanish or English, e.g. 'botón' or 'button'")]
        component: String,

        #[tool(param)]
        #[schemars(description = "Optional variant to narrow the examples, e.g. 'primario'. All variants are returned when omitted or when nothing matches.")]
        variant: Option<String>,
    ) -> Result<DocText, ServiceError> {
        self.component_code(&component, variant.as_deref(), CodeTarget::Nunjucks)
            .await
    }

    #[tool(description = "Get Angular usage examples for a component of the Agora design system")]
    async fn get_component_code_angular(
        &self,
        #[tool(param)]
        #[schemars(description = "Component name, in Spanish or English, e.g. 'botón' or 'button'")]
        component: String,

        #[tool(param)]
        #[schemars(description = "Optional variant to narrow the examples, e.g. 'primario'. All variants are returned when omitted or when nothing matches.")]
        variant: Option<String>,
    ) -> Result<DocText, ServiceError> {
        self.component_code(&component, variant.as_deref(), CodeTarget::Angular)
            .await
    }

    #[tool(description = "Get the documented properties of a component, together with its catalog metadata")]
    async fn get_component_props(
        &self,
        #[tool(param)]
        #[schemars(description = "Component name, in Spanish or English, e.g. 'botón' or 'button'")]
        component: String,
    ) -> Result<PropsReport, ServiceError> {
        let query = component.trim();
        if query.is_empty() {
            return Err(ServiceError::Invalid(
                "The component argument must not be empty.".to_string(),
            ));
        }

        let catalog = self.catalog().await?;
        let Some(Resolution { key, .. }) = resolver::resolve(&catalog, query) else {
            return Err(ServiceError::NotFound(component_not_found(&catalog, query)));
        };

        let rows = catalog.rows_for(&key);
        let resolved = catalog
            .get(&key)
            .ok_or_else(|| ServiceError::NotFound(component_not_found(&catalog, query)))?;

        // Once the name resolved, a missing or unreachable properties page
        // degrades to metadata plus a note instead of failing the call.
        let (props, note) = match rows.iter().copied().find(|c| c.capabilities.has_props) {
            Some(row) => match self.client.fetch_page(&row.url).await {
                Ok(page) => (Some(page), None),
                Err(err) => (
                    None,
                    Some(format!("The properties page could not be fetched: {err}")),
                ),
            },
            None => (
                None,
                Some("No properties page is listed for this component.".to_string()),
            ),
        };

        Ok(PropsReport {
            component: resolved.name.clone(),
            key: resolved.key.clone(),
            category: resolved.category.clone(),
            url: resolved.url.clone(),
            capabilities: combined_capabilities(&rows),
            props,
            note,
        })
    }

    #[tool(description = "Search the component catalog by name, in Spanish or English. Lists the catalog when no query is given. At most 100 results.")]
    async fn search_components(
        &self,
        #[tool(param)]
        #[schemars(description = "Free-text component name. Omit to browse the whole catalog in documentation order.")]
        query: Option<String>,
    ) -> Result<SearchResults, ServiceError> {
        let catalog = self.catalog().await?;
        let trimmed = query.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let matches: Vec<SearchMatch> = match trimmed {
            None => catalog
                .components_in_order()
                .take(MAX_SEARCH_RESULTS)
                .map(|c| SearchMatch::from_component(c, None))
                .collect(),
            Some(q) => {
                let mut candidates: Vec<SearchMatch> = Vec::new();
                // The resolver hit comes first, tagged with how it matched.
                if let Some(Resolution { key, kind }) = resolver::resolve(&catalog, q) {
                    if let Some(component) = catalog.get(&key) {
                        candidates.push(SearchMatch::from_component(component, Some(kind)));
                    }
                }
                let needle = resolver::normalize(q);
                for component in catalog.components_in_order() {
                    let key = resolver::normalize(&component.key);
                    if key.contains(&needle) || needle.contains(&key) {
                        candidates
                            .push(SearchMatch::from_component(component, Some(MatchKind::Substring)));
                    }
                }
                candidates
                    .into_iter()
                    .unique_by(|m| m.key.clone())
                    .take(MAX_SEARCH_RESULTS)
                    .collect()
            }
        };

        Ok(SearchResults {
            query: trimmed.map(str::to_string),
            total: matches.len(),
            matches,
        })
    }

    #[tool(description = "Get a guideline text: a category overview from the catalog, or a documentation guide page such as 'accesibilidad'")]
    async fn get_guideline(
        &self,
        #[tool(param)]
        #[schemars(description = "Category name or guide topic, e.g. 'formulario' or 'accesibilidad'")]
        section: String,
    ) -> Result<DocText, ServiceError> {
        let query = section.trim();
        if query.is_empty() {
            return Err(ServiceError::Invalid(
                "The section argument must not be empty.".to_string(),
            ));
        }

        let catalog = self.catalog().await?;
        if let Some(category) = catalog.find_category(query) {
            return Ok(DocText {
                content: render_category_overview(category),
            });
        }

        let slug = guideline_slug(query);
        match self.client.fetch_guideline(&slug).await {
            Ok(page) => Ok(DocText { content: page }),
            Err(err) => {
                tracing::debug!("Guideline page '{}' unavailable: {}", slug, err);
                Err(ServiceError::NotFound(guideline_not_found(&catalog, query)))
            }
        }
    }

    #[tool(description = "List the catalog's categories with their components, in documentation order")]
    async fn list_categories(&self) -> Result<CategoryListing, ServiceError> {
        let catalog = self.catalog().await?;
        let categories = catalog
            .categories()
            .iter()
            .map(|category| CategorySummary {
                name: category.name.clone(),
                description: category.description.clone(),
                components: category.components.iter().map(|c| c.name.clone()).collect(),
            })
            .collect();
        Ok(CategoryListing { categories })
    }

    #[tool(description = "Refetch and reparse the catalog index immediately, regardless of cache age")]
    async fn refresh_cache(&self) -> Result<RefreshStatus, ServiceError> {
        match self.cache.refresh().await {
            Ok(catalog) => Ok(RefreshStatus {
                status: "ok",
                message: format!(
                    "Catalog refreshed: {} components in {} categories.",
                    catalog.component_count(),
                    catalog.category_count()
                ),
            }),
            Err(err) => Ok(RefreshStatus {
                status: "error",
                message: format!(
                    "Catalog refresh failed: {err}. The previously cached catalog, if any, is still served."
                ),
            }),
        }
    }
}

fn combined_capabilities(rows: &[&Component]) -> Capabilities {
    let mut all = Capabilities::default();
    for row in rows {
        all.has_html_code |= row.capabilities.has_html_code;
        all.has_nunjucks_code |= row.capabilities.has_nunjucks_code;
        all.has_angular_code |= row.capabilities.has_angular_code;
        all.has_props |= row.capabilities.has_props;
    }
    all
}

fn documented_formats(rows: &[&Component]) -> Vec<&'static str> {
    let mut formats = Vec::new();
    if rows.iter().any(|c| c.capabilities.has_html_code) {
        formats.push("HTML markup");
    }
    if rows.iter().any(|c| c.capabilities.has_nunjucks_code) {
        formats.push("Nunjucks templates");
    }
    if rows.iter().any(|c| c.capabilities.has_props) {
        formats.push("properties reference");
    }
    formats
}

fn angular_unavailable(component: &Component, rows: &[&Component]) -> String {
    let formats = documented_formats(rows);
    if formats.is_empty() {
        format!(
            "Angular examples are not documented for '{}', and the catalog index lists no code pages for it.",
            component.name
        )
    } else {
        format!(
            "Angular examples are not documented for '{}'. Documented formats: {}.",
            component.name,
            formats.join(", ")
        )
    }
}

fn component_not_found(catalog: &Catalog, query: &str) -> String {
    let close = resolver::suggestions(catalog, query, MAX_SUGGESTIONS);
    if !close.is_empty() {
        return format!(
            "Component '{query}' was not found. Close matches: {}.",
            close.join(", ")
        );
    }
    let keys: Vec<&str> = catalog.keys_in_order().take(MAX_LISTED_KEYS).collect();
    if keys.is_empty() {
        return format!("Component '{query}' was not found. The catalog is currently empty.");
    }
    let more = if catalog.component_count() > keys.len() {
        ", among others"
    } else {
        ""
    };
    format!(
        "Component '{query}' was not found. Known components: {}{more}.",
        keys.join(", ")
    )
}

fn guideline_not_found(catalog: &Catalog, query: &str) -> String {
    let names: Vec<&str> = catalog
        .categories()
        .iter()
        .map(|c| c.name.as_str())
        .take(MAX_LISTED_KEYS)
        .collect();
    if names.is_empty() {
        format!("Guideline section '{query}' was not found, and the catalog lists no categories.")
    } else {
        format!(
            "Guideline section '{query}' was not found. Known categories: {}.",
            names.join(", ")
        )
    }
}

fn render_category_overview(category: &Category) -> String {
    let mut text = format!("## {}\n\n{}\n", category.name, category.description);
    if !category.components.is_empty() {
        text.push('\n');
        for component in &category.components {
            text.push_str("- ");
            text.push_str(&component.name);
            text.push('\n');
        }
    }
    text
}

fn guideline_slug(section: &str) -> String {
    resolver::normalize(section)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[tool(tool_box)]
impl ServerHandler for CatalogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "This server exposes the component catalog of the Agora design system. \
                Component names are accepted in Spanish or English, with or without diacritics. \
                Use 'search_components' to find components, the 'get_component_code_*' tools for \
                HTML, Nunjucks or Angular usage examples, 'get_component_props' for documented \
                properties, 'list_categories' and 'get_guideline' for catalog overviews, and \
                'refresh_cache' to reload the catalog index. The catalog is cached for a day.".to_string()
            ),
        }
    }

    async fn list_prompts(
        &self,
        _request: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        // Tools only; no prompts.
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: vec![],
        })
    }
}
