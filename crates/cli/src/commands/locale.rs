//! Interface language commands.
//!
//! # Usage
//!
//! ```bash
//! shop locale       # show the current language
//! shop locale ru    # switch to Russian
//! ```

use ecwid_shop_storefront::error::Result;
use ecwid_shop_storefront::locale::Locale;
use ecwid_shop_storefront::state::AppState;

use crate::views::{self, Messages};

/// Show the current locale, or switch to `code` when given.
///
/// # Errors
///
/// Returns an error if `code` is not a supported locale.
pub fn run(state: &mut AppState, code: Option<&str>) -> Result<()> {
    if let Some(code) = code {
        let locale: Locale = code.parse()?;
        state.set_locale(locale);
        tracing::info!(locale = %locale, "Locale changed");
    }

    let locale = state.locale();
    let msg = Messages::for_locale(locale);
    views::emit(&format!(
        "{}: {} ({})",
        msg.language,
        locale.native_name(),
        locale.code()
    ));
    Ok(())
}
