//! Order total calculation.
//!
//! ```text
//! subtotal = Σ(unit_price × quantity)
//! shipping = 0 if subtotal > free_shipping_threshold, else flat_shipping_fee
//! tax      = round_half_up(subtotal × tax_rate, 2)
//! total    = subtotal + shipping + tax − discount
//! ```
//!
//! Client totals are a preview. The server computes the authoritative
//! totals when an order is created; [`OrderTotals::compare`] reports any
//! disagreement instead of silently trusting either side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::LineItem;
use crate::types::Money;

/// Errors building pricing inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// Percentage outside `0..=100`.
    #[error("discount percentage must be between 0 and 100 (got {0})")]
    InvalidPercentage(Decimal),
    /// Negative fixed discount.
    #[error("discount amount cannot be negative")]
    NegativeAmount,
    /// Tax rate outside `0..=1`.
    #[error("tax rate must be between 0 and 1 (got {0})")]
    InvalidTaxRate(Decimal),
}

/// Business constants for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Money,
    /// Shipping charged at or below the threshold.
    pub flat_shipping_fee: Money,
    /// Tax as a fraction (`0.18` for 18%).
    pub tax_rate: Decimal,
}

impl PricingConfig {
    /// Build a config, checking the tax rate.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidTaxRate`] unless `0 <= tax_rate <= 1`.
    pub fn new(
        free_shipping_threshold: Money,
        flat_shipping_fee: Money,
        tax_rate: Decimal,
    ) -> Result<Self, PricingError> {
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
            return Err(PricingError::InvalidTaxRate(tax_rate));
        }
        Ok(Self {
            free_shipping_threshold,
            flat_shipping_fee,
            tax_rate,
        })
    }
}

impl Default for PricingConfig {
    /// ₹2000 free-shipping threshold, ₹99 flat fee, 18% GST.
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_major(2000),
            flat_shipping_fee: Money::from_major(99),
            tax_rate: Decimal::new(18, 2),
        }
    }
}

/// A discount applied to the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Discount {
    /// Percent of the subtotal, `0..=100`.
    Percentage(Decimal),
    /// Fixed amount off.
    Fixed(Money),
}

impl Discount {
    /// Percentage discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPercentage`] outside `0..=100`.
    pub fn percentage(percent: Decimal) -> Result<Self, PricingError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(PricingError::InvalidPercentage(percent));
        }
        Ok(Self::Percentage(percent))
    }

    /// Fixed discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NegativeAmount`] for negative amounts.
    pub fn fixed(amount: Money) -> Result<Self, PricingError> {
        if amount.is_negative() {
            return Err(PricingError::NegativeAmount);
        }
        Ok(Self::Fixed(amount))
    }

    /// Discount amount for a subtotal, rounded half-up and clamped to
    /// `[0, subtotal]`.
    #[must_use]
    pub fn amount_for(&self, subtotal: Money) -> Money {
        let raw = match self {
            Self::Percentage(percent) => subtotal.scale(*percent / Decimal::ONE_HUNDRED),
            Self::Fixed(amount) => amount.round(),
        };
        raw.clamp(Money::ZERO, subtotal.max(Money::ZERO))
    }
}

/// Derived order totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[serde(alias = "itemsPrice")]
    pub subtotal: Money,
    #[serde(alias = "shippingPrice", alias = "shipping")]
    pub shipping_cost: Money,
    #[serde(alias = "taxPrice", alias = "tax")]
    pub tax_amount: Money,
    #[serde(default, alias = "discount")]
    pub discount_amount: Money,
    #[serde(alias = "totalPrice", alias = "totalAmount")]
    pub total: Money,
}

/// One field on which two totals disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub preview: Money,
    pub server: Money,
}

/// Differences between a client preview and the server's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsMismatch {
    pub fields: Vec<FieldMismatch>,
}

impl std::fmt::Display for TotalsMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|m| format!("{} preview {} vs server {}", m.field, m.preview, m.server))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl OrderTotals {
    /// Compare a client preview (`self`) with the server's totals.
    ///
    /// Returns `None` when every field matches to the paisa.
    #[must_use]
    pub fn compare(&self, server: &Self) -> Option<TotalsMismatch> {
        let pairs = [
            ("subtotal", self.subtotal, server.subtotal),
            ("shipping", self.shipping_cost, server.shipping_cost),
            ("tax", self.tax_amount, server.tax_amount),
            ("discount", self.discount_amount, server.discount_amount),
            ("total", self.total, server.total),
        ];

        let fields: Vec<FieldMismatch> = pairs
            .into_iter()
            .filter(|(_, preview, server)| preview.round() != server.round())
            .map(|(field, preview, server)| FieldMismatch {
                field,
                preview,
                server,
            })
            .collect();

        if fields.is_empty() {
            None
        } else {
            Some(TotalsMismatch { fields })
        }
    }
}

/// Compute order totals for a list of line items.
///
/// Pure and order-independent. Tax and percentage discounts are rounded
/// to two decimals half-up (midpoint away from zero). The free-shipping
/// decision uses the subtotal before discount. An empty cart costs nothing,
/// shipping included.
#[must_use]
pub fn calculate_totals(
    items: &[LineItem],
    config: &PricingConfig,
    discount: Option<&Discount>,
) -> OrderTotals {
    if items.is_empty() {
        return OrderTotals::default();
    }

    let subtotal: Money = items.iter().map(LineItem::line_total).sum();
    let shipping_cost = if subtotal > config.free_shipping_threshold {
        Money::ZERO
    } else {
        config.flat_shipping_fee
    };
    let tax_amount = subtotal.scale(config.tax_rate);
    let discount_amount = discount.map_or(Money::ZERO, |d| d.amount_for(subtotal));
    let total = subtotal + shipping_cost + tax_amount - discount_amount;

    OrderTotals {
        subtotal,
        shipping_cost,
        tax_amount,
        discount_amount,
        total,
    }
}
