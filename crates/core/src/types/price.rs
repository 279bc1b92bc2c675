//! Money representation using decimal arithmetic.
//!
//! The store trades in a single currency (Indian rupees), so `Money` is a
//! thin wrapper over [`Decimal`] rather than an amount/currency pair.
//! Amounts go over the wire as JSON numbers.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places used for every displayed or stored amount.
pub const MONEY_SCALE: u32 = 2;

/// A monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Currency symbol used when formatting.
    pub const SYMBOL: &'static str = "\u{20b9}";

    /// ISO 4217 code of the store currency.
    pub const CURRENCY_CODE: &'static str = "INR";

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole rupees.
    #[must_use]
    pub fn from_major(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// Amount in paise (hundredths), e.g. `12_345` for `123.45`.
    #[must_use]
    pub fn from_minor(paise: i64) -> Self {
        Self(Decimal::new(paise, MONEY_SCALE))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round to two decimals, half-up (midpoint away from zero).
    ///
    /// `0.125` becomes `0.13`, `0.124` becomes `0.12`. All computed amounts
    /// (tax, percentage discounts) go through this one rule.
    #[must_use]
    pub fn round(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Multiply by a rate and round half-up.
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        Self(self.0 * rate).round()
    }

    /// Amount in paise, as payment gateways expect.
    ///
    /// The amount is rounded half-up first. Returns `None` if the result
    /// does not fit in an `i64`.
    #[must_use]
    pub fn to_minor(self) -> Option<i64> {
        let paise = self.round().0 * Decimal::ONE_HUNDRED;
        i64::try_from(paise.normalize()).ok()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round().0;
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-{}{:.2}", Self::SYMBOL, rounded.abs())
        } else {
            write!(f, "{}{:.2}", Self::SYMBOL, rounded)
        }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
