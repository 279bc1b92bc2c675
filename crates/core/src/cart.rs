//! Cart and line item types.
//!
//! The cart is an ordered list of line items keyed by product. Every
//! mutation keeps `1 <= quantity <= stock_limit` and reports what changed
//! as a [`CartChange`], which callers turn into the matching remote call.

use serde::{Deserialize, Serialize};

use crate::pricing::{Discount, OrderTotals, PricingConfig, calculate_totals};
use crate::types::{Money, ProductId};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Adding zero items.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// The product has no stock left.
    #[error("{0} is out of stock")]
    OutOfStock(String),
    /// A negative unit price.
    #[error("price of {0} cannot be negative")]
    NegativePrice(String),
}

/// The product facts a cart needs when an item is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    /// Units available; the cart never holds more than this.
    pub stock_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub stock_limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LineItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// What a mutation did, in the terms the remote cart understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// `added` more units of the product; the line now holds `quantity`.
    Added {
        product_id: ProductId,
        added: u32,
        quantity: u32,
    },
    /// The line's quantity was set to `quantity`.
    Updated { product_id: ProductId, quantity: u32 },
    /// The line was removed.
    Removed { product_id: ProductId },
    /// Nothing changed (already at the cap, absent product, same quantity).
    Unchanged,
}

impl CartChange {
    /// Whether anything changed.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Quantity held on both sides but with different values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuantityMismatch {
    pub product_id: ProductId,
    pub local: u32,
    pub server: u32,
}

/// Difference between a local cart and the server's copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartDiff {
    /// Products only present locally.
    pub local_only: Vec<ProductId>,
    /// Products only present on the server.
    pub server_only: Vec<ProductId>,
    /// Products present on both sides with different quantities.
    pub quantity_mismatch: Vec<QuantityMismatch>,
}

impl CartDiff {
    /// Whether both carts hold the same products and quantities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local_only.is_empty()
            && self.server_only.is_empty()
            && self.quantity_mismatch.is_empty()
    }
}

/// A shopping cart.
///
/// Deserializing goes through [`Cart::from_items`], so a saved cart that
/// was edited by hand still satisfies the cart invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartFile")]
pub struct Cart {
    items: Vec<LineItem>,
}

/// Serialized shape of a [`Cart`].
#[derive(Deserialize)]
struct CartFile {
    #[serde(default)]
    items: Vec<LineItem>,
}

impl From<CartFile> for Cart {
    fn from(file: CartFile) -> Self {
        Self::from_items(file.items)
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, e.g. the server's copy.
    ///
    /// Duplicate products are merged, zero quantities dropped and every
    /// quantity clamped to its stock limit, so the result always satisfies
    /// the cart invariants.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if let Some(existing) = cart.find_mut(&item.product_id) {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(existing.stock_limit);
            } else if item.quantity > 0 && item.stock_limit > 0 {
                let quantity = item.quantity.min(item.stock_limit);
                cart.items.push(LineItem { quantity, ..item });
            }
        }
        cart
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line is incremented rather than duplicated; the result
    /// is capped at the product's stock limit. The stock limit and price on
    /// an existing line are refreshed from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero,
    /// [`CartError::OutOfStock`] if the product has no stock and
    /// [`CartError::NegativePrice`] for a negative price.
    pub fn add(&mut self, product: &ProductSnapshot, quantity: u32) -> Result<CartChange, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if product.unit_price.is_negative() {
            return Err(CartError::NegativePrice(product.name.clone()));
        }
        if product.stock_limit == 0 {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        if let Some(existing) = self.find_mut(&product.product_id) {
            let before = existing.quantity;
            existing.stock_limit = product.stock_limit;
            existing.unit_price = product.unit_price;
            existing.quantity = before.saturating_add(quantity).min(product.stock_limit);

            let after = existing.quantity;
            return Ok(match after.cmp(&before) {
                std::cmp::Ordering::Greater => CartChange::Added {
                    product_id: product.product_id.clone(),
                    added: after - before,
                    quantity: after,
                },
                std::cmp::Ordering::Equal => CartChange::Unchanged,
                // Stock shrank below what the line held.
                std::cmp::Ordering::Less => CartChange::Updated {
                    product_id: product.product_id.clone(),
                    quantity: after,
                },
            });
        }

        let quantity = quantity.min(product.stock_limit);
        self.items.push(LineItem {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
            stock_limit: product.stock_limit,
            brand: product.brand.clone(),
            image: product.image.clone(),
        });

        Ok(CartChange::Added {
            product_id: product.product_id.clone(),
            added: quantity,
            quantity,
        })
    }

    /// Set a line's quantity.
    ///
    /// `quantity <= 0` behaves exactly like [`Cart::remove`]; anything else
    /// is clamped to the stock limit. Unknown products are a no-op.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> CartChange {
        if quantity <= 0 {
            return self.remove(product_id);
        }

        let Some(item) = self.find_mut(product_id) else {
            return CartChange::Unchanged;
        };

        let target = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(item.stock_limit);
        if target == item.quantity {
            return CartChange::Unchanged;
        }

        item.quantity = target;
        CartChange::Updated {
            product_id: product_id.clone(),
            quantity: target,
        }
    }

    /// Remove a line. No-op if absent.
    pub fn remove(&mut self, product_id: &ProductId) -> CartChange {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        if self.items.len() < len_before {
            CartChange::Removed {
                product_id: product_id.clone(),
            }
        } else {
            CartChange::Unchanged
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Total number of units (sum of quantities).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pricing preview for the current contents.
    #[must_use]
    pub fn totals(&self, config: &PricingConfig, discount: Option<&Discount>) -> OrderTotals {
        calculate_totals(&self.items, config, discount)
    }

    /// Compare this (local) cart against the server's copy.
    #[must_use]
    pub fn diff(&self, server: &Self) -> CartDiff {
        let mut diff = CartDiff::default();

        for local in &self.items {
            match server.get(&local.product_id) {
                None => diff.local_only.push(local.product_id.clone()),
                Some(remote) if remote.quantity != local.quantity => {
                    diff.quantity_mismatch.push(QuantityMismatch {
                        product_id: local.product_id.clone(),
                        local: local.quantity,
                        server: remote.quantity,
                    });
                }
                Some(_) => {}
            }
        }

        diff.server_only = server
            .items
            .iter()
            .filter(|remote| self.get(&remote.product_id).is_none())
            .map(|remote| remote.product_id.clone())
            .collect();

        diff
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|i| &i.product_id == product_id)
    }
}
