//! Catalog management.

use scentbox_core::ProductId;
use scentbox_storefront::api::{Access, ApiPath, Product, ProductPage};
use serde::de::IgnoredAny;
use tracing::instrument;

use crate::{AdminClient, AdminError, ProductInput};

impl AdminClient {
    /// Every product, including out-of-stock ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, AdminError> {
        let page: ProductPage = self
            .api()
            .get("/admin/products", Access::Authenticated)
            .await?;
        Ok(page.products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for bad input (nothing is sent), or
    /// an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, AdminError> {
        input.validate()?;

        let product: Product = self
            .api()
            .post("/admin/products", input, Access::Authenticated)
            .await?;
        self.api().invalidate_catalog();
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for bad input (nothing is sent), or
    /// an error if the API request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, AdminError> {
        input.validate()?;

        let product: Product = self
            .api()
            .put(ApiPath::new("/admin/products").id(id), input, Access::Authenticated)
            .await?;
        self.api().invalidate_catalog();
        tracing::info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        let _: IgnoredAny = self
            .api()
            .delete(ApiPath::new("/admin/products").id(id), Access::Authenticated)
            .await?;
        self.api().invalidate_catalog();
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
