//! Server cart endpoints.

use scentbox_core::{Cart, CartChange, ProductId};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::{Access, ApiClient, ApiPath};
use super::types::{AddToCartRequest, RemoteCart, UpdateCartRequest};
use super::ApiError;

impl ApiClient {
    /// The server's copy of the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        let remote: RemoteCart = self.get("/cart", Access::Authenticated).await?;
        Ok(remote.into_cart())
    }

    /// Add `quantity` units to the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            product_id,
            quantity,
        };
        let _: IgnoredAny = self.post("/cart/add", &body, Access::Authenticated).await?;
        Ok(())
    }

    /// Set the quantity of a server cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_cart_item(&self, product_id: &ProductId, quantity: u32) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .put(
                ApiPath::new("/cart/update").id(product_id),
                &UpdateCartRequest { quantity },
                Access::Authenticated,
            )
            .await?;
        Ok(())
    }

    /// Remove a line from the server cart.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .delete(ApiPath::new("/cart/remove").id(product_id), Access::Authenticated)
            .await?;
        Ok(())
    }

    /// Send one local cart change to the server.
    ///
    /// [`CartChange::Unchanged`] sends nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    pub async fn apply_cart_change(&self, change: &CartChange) -> Result<(), ApiError> {
        match change {
            CartChange::Added {
                product_id, added, ..
            } => self.add_to_cart(product_id, *added).await,
            CartChange::Updated {
                product_id,
                quantity,
            } => self.update_cart_item(product_id, *quantity).await,
            CartChange::Removed { product_id } => self.remove_from_cart(product_id).await,
            CartChange::Unchanged => Ok(()),
        }
    }
}
