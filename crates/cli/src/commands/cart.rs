//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! shop cart show
//! shop cart add 692730761 -q 2
//! shop cart update 692730761 5
//! shop cart remove 692730761
//! shop cart clear
//! ```
//!
//! Every command needs the Ecwid settings to start. Only `add` calls the
//! catalog; the others read and write the locally stored cart.

use ecwid_shop_core::ProductId;
use ecwid_shop_storefront::error::{AppError, Result};
use ecwid_shop_storefront::state::AppState;

use crate::views::{self, Messages};

/// Print the cart.
pub fn show(state: &AppState) {
    views::emit(&views::cart(
        state.cart(),
        Messages::for_locale(state.locale()),
    ));
}

/// Fetch a product from the catalog and add it to the cart.
///
/// # Errors
///
/// Returns an error if `quantity` is zero or the product cannot be fetched.
pub async fn add(state: &mut AppState, id: ProductId, quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let product = state.catalog().get_product(id).await?;
    state.cart_mut().add_to_cart(&product, quantity);
    tracing::info!(product_id = %id, quantity, "Added to cart");

    let msg = Messages::for_locale(state.locale());
    views::emit(&format!("{}: {} x{quantity}", msg.added, product.name));
    finish(state);
    Ok(())
}

/// Remove a product from the cart. Removing an absent product is not an error.
pub fn remove(state: &mut AppState, id: ProductId) {
    let removed = state.cart_mut().remove_from_cart(id);
    let msg = Messages::for_locale(state.locale());
    views::emit(if removed { msg.removed } else { msg.not_in_cart });
    finish(state);
}

/// Set the quantity of a product already in the cart (0 or less removes it).
pub fn update(state: &mut AppState, id: ProductId, quantity: i64) {
    let matched = state.cart_mut().update_quantity(id, quantity);
    let msg = Messages::for_locale(state.locale());
    let text = match (matched, quantity <= 0) {
        (false, _) => msg.not_in_cart,
        (true, true) => msg.removed,
        (true, false) => msg.updated,
    };
    views::emit(text);
    finish(state);
}

/// Empty the cart.
pub fn clear(state: &mut AppState) {
    state.cart_mut().clear_cart();
    views::emit(Messages::for_locale(state.locale()).cleared);
    finish(state);
}

/// Show the cart after a mutation and warn if it was not saved.
fn finish(state: &AppState) {
    show(state);
    if state.cart().last_persist_failed() {
        views::emit(Messages::for_locale(state.locale()).not_saved);
    }
}
