//! Account endpoints.

use scentbox_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::client::{Access, ApiClient};
use super::types::{AuthResponse, LoginRequest, RegisterRequest, User};
use super::ApiError;

impl ApiClient {
    /// Exchange credentials for a session token.
    ///
    /// Does not attach the token; see [`crate::session::SessionManager`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for wrong credentials, or an error if
    /// the API request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.post("/auth/login", &body, Access::Public).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BusinessRule` when the email is taken, or an error
    /// if the API request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        name: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            name,
            email: email.as_str(),
            password: password.expose_secret(),
        };
        self.post("/auth/register", &body, Access::Public).await
    }

    /// The account behind the current token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthenticated` without a token and
    /// `ApiError::Unauthorized` if the server rejects it.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me", Access::Authenticated).await
    }
}
