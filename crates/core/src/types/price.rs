//! Type-safe price representation using decimal arithmetic.
//!
//! Ecwid reports prices as plain JSON numbers in the store's currency, so a
//! [`Price`] carries only the amount. Arithmetic stays in [`Decimal`] to avoid
//! binary floating point drift when summing line totals.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of decimal places used for display.
const DISPLAY_SCALE: u32 = 2;

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input string is not a decimal number.
    #[error("invalid price '{0}'")]
    Invalid(String),
}

/// A unit price in the store currency.
///
/// Serializes as a JSON number (`9.99`) to match the Ecwid wire format and the
/// persisted cart layout. Deserializes from either a number or a string.
///
/// ## Examples
///
/// ```
/// use ecwid_shop_core::Price;
///
/// let price: Price = "9.99".parse().unwrap();
/// assert_eq!(price.to_string(), "9.99");
/// assert_eq!(ecwid_shop_core::format_amount(price.times(2)), "19.98");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Amount for `quantity` units at this price.
    ///
    /// Saturates at [`Decimal::MAX`] (or [`Decimal::MIN`]) instead of
    /// overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity))
    }
}

/// Round an amount to two decimals (midpoint away from zero) and render it
/// with exactly two fractional digits.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_SCALE);
    rounded.to_string()
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim())
            .map(Self)
            .map_err(|_| PriceError::Invalid(s.to_owned()))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self)
    }
}
