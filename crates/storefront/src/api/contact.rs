//! Contact form.

use scentbox_core::Email;
use serde::de::IgnoredAny;
use tracing::instrument;

use super::client::{Access, ApiClient};
use super::types::ContactRequest;
use super::ApiError;

/// Longest accepted message body.
pub const MAX_MESSAGE_LENGTH: usize = 5000;

impl ContactRequest {
    /// Check the form before sending.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is required".to_string());
        }
        Email::parse(&self.email).map_err(|e| e.to_string())?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err("message is required".to_string());
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(format!("message must be at most {MAX_MESSAGE_LENGTH} characters"));
        }
        Ok(())
    }
}

impl ApiClient {
    /// Send a message to the store.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BusinessRule` if the form is incomplete, or an error
    /// if the API request fails.
    #[instrument(skip(self, request))]
    pub async fn submit_contact(&self, request: &ContactRequest) -> Result<(), ApiError> {
        request.validate().map_err(ApiError::BusinessRule)?;
        let _: IgnoredAny = self.post("/contact", request, Access::OptionalAuth).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            subject: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_contact_validation() {
        assert!(request("Asha", "asha@example.com", "Is Oud Noir back?").validate().is_ok());
        assert!(request(" ", "asha@example.com", "hi").validate().is_err());
        assert!(request("Asha", "not-an-email", "hi").validate().is_err());
        assert!(request("Asha", "asha@example.com", "  ").validate().is_err());
        assert!(
            request("Asha", "asha@example.com", &"x".repeat(MAX_MESSAGE_LENGTH + 1))
                .validate()
                .is_err()
        );
    }
}
