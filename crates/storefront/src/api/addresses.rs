//! Saved address endpoints.

use scentbox_core::AddressId;
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::{Access, ApiClient, ApiPath};
use super::types::{AddressInput, SavedAddress};
use super::ApiError;

impl ApiClient {
    /// Addresses saved on the account.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<SavedAddress>, ApiError> {
        self.get("/addresses", Access::Authenticated).await
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<SavedAddress, ApiError> {
        self.post("/addresses", input, Access::Authenticated).await
    }

    /// Replace a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        input: &AddressInput,
    ) -> Result<SavedAddress, ApiError> {
        self.put(ApiPath::new("/addresses").id(id), input, Access::Authenticated)
            .await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .delete(ApiPath::new("/addresses").id(id), Access::Authenticated)
            .await?;
        Ok(())
    }
}
