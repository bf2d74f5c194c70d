//! Integration tests for the Ecwid shop client.
//!
//! # Running Tests
//!
//! ```bash
//! # Offline scenario tests
//! cargo test -p ecwid-shop-integration-tests
//!
//! # Live Ecwid API tests (need ECWID_STORE_ID and ECWID_PUBLIC_TOKEN)
//! cargo test -p ecwid-shop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart behaviour across reloads of a file-backed store
//! - `catalog_live` - Read-only calls against a real Ecwid store

#![cfg_attr(not(test), forbid(unsafe_code))]

use ecwid_shop_core::ProductId;
use ecwid_shop_storefront::catalog::Product;

/// Build a catalog product for tests.
///
/// # Panics
///
/// Panics if `price` is not a decimal number.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: i64, name: &str, price: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: price.parse().unwrap(),
        description: None,
        thumbnail_url: Some(format!("https://images.test/{id}-thumb.jpg")),
        image_url: Some(format!("https://images.test/{id}.jpg")),
    }
}
