//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! shop categories
//! shop products --limit 20
//! shop products --category 12345
//! shop product 692730761
//! ```

use ecwid_shop_core::{CategoryId, ProductId};
use ecwid_shop_storefront::error::Result;
use ecwid_shop_storefront::state::AppState;

use crate::views::{self, Messages};

/// List all categories.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
pub async fn categories(state: &AppState) -> Result<()> {
    let list = state.catalog().get_categories().await?;
    tracing::debug!(count = list.len(), "Fetched categories");
    views::emit(&views::categories(
        &list,
        Messages::for_locale(state.locale()),
    ));
    Ok(())
}

/// List products, optionally restricted to one category.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
pub async fn products(state: &AppState, category: Option<CategoryId>, limit: u32) -> Result<()> {
    let list = match category {
        Some(id) => state.catalog().get_products_by_category(id).await?,
        None => state.catalog().get_products(limit).await?,
    };
    views::emit(&views::products(&list, Messages::for_locale(state.locale())));
    Ok(())
}

/// Show a single product.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
pub async fn product(state: &AppState, id: ProductId) -> Result<()> {
    let product = state.catalog().get_product(id).await?;
    views::emit(&views::product(&product));
    Ok(())
}
