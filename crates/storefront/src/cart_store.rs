//! Local-first cart with best-effort remote sync.
//!
//! Mutations are applied to the in-memory [`Cart`] immediately and then
//! pushed to the backend. A failed push never rolls the local change back;
//! it marks the store as diverged until the next [`CartStore::reconcile`].

use std::fs;
use std::path::Path;

use scentbox_core::{
    Cart, CartChange, CartDiff, CartError, Discount, LineItem, OrderTotals, PricingConfig,
    ProductId, ProductSnapshot,
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, CartSync};
use crate::error::add_breadcrumb;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// Adding to the cart needs a signed-in session.
    #[error("Please sign in to add items to your cart")]
    Unauthenticated,

    #[error(transparent)]
    Cart(#[from] CartError),

    /// Reading or writing the local cart file failed.
    #[error("Cart storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The local cart file is not valid JSON.
    #[error("Cart file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// What happened to the remote copy after a local mutation.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The backend accepted the change.
    Synced,
    /// Nothing was sent: no change, or no session.
    Skipped,
    /// The backend call failed; the local change stands.
    Failed(ApiError),
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// The shopper's cart plus its remote mirror.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    sync: S,
    diverged: bool,
}

impl<S: CartSync> CartStore<S> {
    /// Create an empty store.
    pub fn new(sync: S) -> Self {
        Self::with_cart(sync, Cart::new())
    }

    /// Create a store seeded with a previously saved cart.
    pub const fn with_cart(sync: S, cart: Cart) -> Self {
        Self {
            cart,
            sync,
            diverged: false,
        }
    }

    /// Add `quantity` units of a product, capped at its stock.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a session, or the cart's own
    /// validation error. Remote failures are reported in the outcome.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add(
        &mut self,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<SyncOutcome, CartStoreError> {
        if !self.sync.has_session().await {
            return Err(CartStoreError::Unauthenticated);
        }

        let change = self.cart.add(product, quantity)?;
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[
                ("product_id", product.product_id.as_str()),
                ("quantity", &quantity.to_string()),
            ]),
        );
        Ok(self.push(&change).await)
    }

    /// Set a line's quantity. Zero or less removes the line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&mut self, product_id: &ProductId, quantity: i64) -> SyncOutcome {
        let change = self.cart.update_quantity(product_id, quantity);
        if change.is_change() {
            add_breadcrumb(
                "cart",
                "Updated cart quantity",
                Some(&[
                    ("product_id", product_id.as_str()),
                    ("quantity", &quantity.to_string()),
                ]),
            );
        }
        self.push_if_signed_in(&change).await
    }

    /// Remove a line. Absent products are a no-op.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&mut self, product_id: &ProductId) -> SyncOutcome {
        let change = self.cart.remove(product_id);
        if change.is_change() {
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
        self.push_if_signed_in(&change).await
    }

    /// Empty the local cart. The backend clears its copy when an order is
    /// placed, so nothing is sent.
    pub fn clear(&mut self) {
        self.cart.clear();
    }

    /// Drop local state on sign-out.
    pub fn on_logout(&mut self) {
        self.cart.clear();
        self.diverged = false;
    }

    /// Replace the local cart with the server's and report what differed.
    ///
    /// # Errors
    ///
    /// Returns the API error if the server cart cannot be fetched; the
    /// local cart is left untouched.
    #[instrument(skip(self))]
    pub async fn reconcile(&mut self) -> Result<CartDiff, ApiError> {
        let server = self.sync.fetch_cart().await?;
        let diff = self.cart.diff(&server);
        if !diff.is_empty() {
            debug!(
                local_only = diff.local_only.len(),
                server_only = diff.server_only.len(),
                mismatched = diff.quantity_mismatch.len(),
                "Adopting server cart"
            );
        }
        self.cart = server;
        self.diverged = false;
        Ok(diff)
    }

    /// Load the server cart, replacing local state.
    ///
    /// # Errors
    ///
    /// Returns the API error if the server cart cannot be fetched.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.reconcile().await.map(|_| ())
    }

    async fn push_if_signed_in(&mut self, change: &CartChange) -> SyncOutcome {
        if !change.is_change() || !self.sync.has_session().await {
            return SyncOutcome::Skipped;
        }
        self.push(change).await
    }

    async fn push(&mut self, change: &CartChange) -> SyncOutcome {
        if !change.is_change() {
            return SyncOutcome::Skipped;
        }
        match self.sync.push_change(change).await {
            Ok(()) => SyncOutcome::Synced,
            Err(e) => {
                warn!(error = %e, "Cart sync failed, keeping local change");
                self.diverged = true;
                SyncOutcome::Failed(e)
            }
        }
    }
}

impl<S> CartStore<S> {
    /// The current cart.
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub(crate) const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.cart.get(product_id)
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Preview totals for the current contents.
    pub fn totals(&self, config: &PricingConfig, discount: Option<&Discount>) -> OrderTotals {
        self.cart.totals(config, discount)
    }

    /// Whether a sync failed since the last reconciliation.
    pub const fn is_diverged(&self) -> bool {
        self.diverged
    }
}

/// Read a saved cart. A missing file is an empty cart.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_cart_file(path: &Path) -> Result<Cart, CartStoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Cart::new()),
        Err(e) => Err(e.into()),
    }
}

/// Save the cart so it survives between runs.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub fn write_cart_file(path: &Path, cart: &Cart) -> Result<(), CartStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(cart)?)?;
    Ok(())
}
