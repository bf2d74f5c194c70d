//! Domain types for the Ecwid REST catalog.
//!
//! Field names follow the Ecwid JSON (`thumbnailUrl`, `productCount`, ...);
//! unknown fields are ignored so API additions don't break parsing.

use serde::{Deserialize, Serialize};

use ecwid_shop_core::{CategoryId, Price, ProductId};

// =============================================================================
// Product Types
// =============================================================================

/// A catalog product, as accepted by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Ecwid product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Base price in the store currency.
    pub price: Price,
    /// HTML description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Small product image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Full-size product image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

// =============================================================================
// Category Types
// =============================================================================

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Ecwid category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Number of enabled products in the category.
    #[serde(default)]
    pub product_count: u32,
    /// Parent category, `None` for root categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Sort position among siblings.
    #[serde(default)]
    pub order_by: i32,
    /// Storefront URL of the category page.
    #[serde(default)]
    pub url: String,
    /// Whether the category is visible in the storefront.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

// =============================================================================
// Pagination
// =============================================================================

/// Paged search result envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage<T> {
    /// Total number of matches across all pages.
    #[serde(default)]
    pub total: u32,
    /// Number of items in this page.
    #[serde(default)]
    pub count: u32,
    /// Offset of the first item.
    #[serde(default)]
    pub offset: u32,
    /// Page size requested.
    #[serde(default)]
    pub limit: u32,
    /// The items.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
