//! Application state owned by the front end's composition root.

use crate::cart::CartStore;
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::locale::{self, Locale};
use crate::storage::FileStore;

/// Everything a view needs: configuration, the catalog client, the cart and
/// the interface locale.
///
/// Built once at startup and handed to views by reference. The cart is
/// mutated through [`AppState::cart_mut`]; there is exactly one cart per
/// `AppState`.
#[derive(Debug)]
pub struct AppState {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartStore<FileStore>,
    locale: Locale,
}

impl AppState {
    /// Create the application state, loading the cart and locale from local
    /// storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let catalog = CatalogClient::new(&config.ecwid)?;

        let storage = FileStore::new(&config.storage_path);
        let locale = locale::load_locale(&storage);
        let cart = CartStore::load_from(storage, config.cart_key.clone());

        tracing::info!(
            storage = %config.storage_path.display(),
            cart_items = cart.item_count(),
            locale = %locale,
            "Storefront state initialized"
        );

        Ok(Self {
            config,
            catalog,
            cart,
            locale,
        })
    }

    /// Get a reference to the Ecwid catalog client.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    /// Get a reference to the cart.
    #[must_use]
    pub const fn cart(&self) -> &CartStore<FileStore> {
        &self.cart
    }

    /// Get a mutable reference to the cart.
    pub const fn cart_mut(&mut self) -> &mut CartStore<FileStore> {
        &mut self.cart
    }

    /// Current interface locale.
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Switch the interface locale and persist the choice.
    ///
    /// The in-memory locale changes even if saving fails.
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        let mut storage = FileStore::new(&self.config.storage_path);
        locale::save_locale(&mut storage, locale);
    }
}
