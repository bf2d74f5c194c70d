//! Interface language preference.
//!
//! The selected locale lives in its own storage slot next to the cart. An
//! empty slot or an unknown code falls back to English.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

use crate::storage::{KeyValueStore, keys};

/// Supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

/// An unsupported locale code.
#[derive(Debug, Error)]
#[error("unsupported locale '{0}' (expected one of: en, ru)")]
pub struct UnknownLocale(String);

impl Locale {
    /// All supported locales, fallback first.
    pub const ALL: [Self; 2] = [Self::English, Self::Russian];

    /// BCP 47 language code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
        }
    }

    /// Human-readable name in the language itself.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Russian => "Русский",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.code() == code)
            .ok_or_else(|| UnknownLocale(s.to_owned()))
    }
}

/// Read the saved locale, falling back to [`Locale::English`].
pub fn load_locale<S: KeyValueStore>(storage: &S) -> Locale {
    match storage.get_item(keys::LOCALE) {
        Ok(Some(code)) => code.parse().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring saved locale");
            Locale::default()
        }),
        Ok(None) => Locale::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Error loading locale from storage");
            Locale::default()
        }
    }
}

/// Save the locale. A storage failure is logged and reported as `false`.
pub fn save_locale<S: KeyValueStore>(storage: &mut S, locale: Locale) -> bool {
    match storage.set_item(keys::LOCALE, locale.code()) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, locale = %locale, "Error saving locale to storage");
            false
        }
    }
}
