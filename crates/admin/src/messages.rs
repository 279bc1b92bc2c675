//! Contact form inbox.

use scentbox_core::MessageId;
use scentbox_storefront::api::{Access, ApiPath, ContactMessage};
use serde::de::IgnoredAny;
use tracing::instrument;

use crate::{AdminClient, AdminError};

impl AdminClient {
    /// Messages sent through the contact form, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_messages(&self) -> Result<Vec<ContactMessage>, AdminError> {
        let mut messages: Vec<ContactMessage> =
            self.api().get("/contact", Access::Authenticated).await?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    /// Delete a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn delete_message(&self, id: &MessageId) -> Result<(), AdminError> {
        let _: IgnoredAny = self
            .api()
            .delete(ApiPath::new("/contact").id(id), Access::Authenticated)
            .await?;
        Ok(())
    }
}
