//! Ecwid REST catalog client.
//!
//! # Architecture
//!
//! - Plain `reqwest` JSON requests against `{base}/{store_id}/...`
//! - Public access token sent as a bearer token on every request
//! - Ecwid is the source of truth - NO local sync, direct API calls
//! - In-memory caching via `moka` for API responses (5 minute TTL)
//!
//! The catalog is independent of the cart: views fetch products here and pass
//! completed [`Product`] records to [`crate::cart::CartStore::add_to_cart`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ecwid_shop_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.ecwid)?;
//!
//! let categories = client.get_categories().await?;
//! let product = client.get_product(ProductId::new(692730761)).await?;
//! cart.add_to_cart(&product, 1);
//! ```

mod cache;
pub mod types;

pub use types::{Category, ItemsPage, Product};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use ecwid_shop_core::{CategoryId, ProductId};

use crate::config::EcwidConfig;

use cache::{CacheKey, CacheValue};

/// Default page size for the product listing.
pub const DEFAULT_PRODUCT_LIMIT: u32 = 10;

/// Maximum number of characters of an error body kept for diagnostics.
const ERROR_BODY_PREVIEW: usize = 200;

/// Errors that can occur when interacting with the Ecwid API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Ecwid.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Access token cannot be used as a header value.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the Ecwid REST catalog.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    /// `{base}/{store_id}` without a trailing slash.
    store_root: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("store_root", &self.inner.store_root)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &EcwidConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();

        let mut auth_value = HeaderValue::from_str(&config.bearer())
            .map_err(|e| CatalogError::InvalidToken(e.to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let store_root = format!(
            "{}/{}",
            config.base_url.as_str().trim_end_matches('/'),
            config.store_id
        );

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                store_root,
                cache,
            }),
        })
    }

    /// Build the URL for `path` relative to the store root.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&format!("{}/{path}", self.inner.store_root))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url.path(),
                body = %body.chars().take(500).collect::<String>(),
                "Ecwid API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Ecwid response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List the first `limit` products of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, limit: u32) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::Products { limit };
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let url = self.endpoint("products", &[("limit", limit.to_string())])?;
        let page: ItemsPage<Product> = self.get_json(url).await?;
        debug!(total = page.total, count = page.items.len(), "Fetched products");

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.items.clone()))
            .await;
        Ok(page.items)
    }

    /// List the products assigned to a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_products_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = CacheKey::ProductsByCategory(category_id);
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let url = self.endpoint("products", &[("category", category_id.to_string())])?;
        let page: ItemsPage<Product> = self.get_json(url).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(page.items.clone()))
            .await;
        Ok(page.items)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&format!("products/{id}"), &[])?;
        let product: Product = self.get_json(url).await.map_err(|e| match e {
            CatalogError::NotFound(_) => CatalogError::NotFound(format!("Product not found: {id}")),
            other => other,
        })?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List all categories of the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint("categories", &[])?;
        let page: ItemsPage<Category> = self.get_json(url).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(page.items.clone()))
            .await;
        Ok(page.items)
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}
