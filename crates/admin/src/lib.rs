//! Scentbox admin client.
//!
//! Store management over the same REST backend the storefront uses. Every
//! call needs a signed-in account with the `admin` role.
//!
//! # Supported Features
//!
//! - **Dashboard**: store-wide counts, revenue, recent orders, low stock
//! - **Users**: list, change role, delete
//! - **Products**: list, create, update, delete
//! - **Orders**: list by status, advance status
//! - **Uploads**: product images (jpg, png, webp up to 5 MiB)
//! - **Contact messages**: list, delete

#![cfg_attr(not(test), forbid(unsafe_code))]

mod dashboard;
mod messages;
mod orders;
mod products;
mod types;
mod uploads;
mod users;

pub use types::*;
pub use uploads::{MAX_IMAGE_BYTES, image_content_type};

use scentbox_core::OrderStatus;
use scentbox_storefront::api::{ApiClient, ApiError, User};
use scentbox_storefront::AppError;
use thiserror::Error;

/// Errors from admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The signed-in account is not an administrator.
    #[error("Admin access required")]
    Forbidden,

    /// No session.
    #[error("Not signed in")]
    Unauthenticated,

    /// The backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before sending.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The requested order status change is not allowed.
    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    /// Image extension is not jpg, jpeg, png or webp.
    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    /// Image exceeds [`MAX_IMAGE_BYTES`].
    #[error("Image is too large ({size} bytes, max {max})")]
    ImageTooLarge { size: u64, max: u64 },

    /// The image file could not be read.
    #[error("Could not read image: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Forbidden => Self::Forbidden(err.to_string()),
            AdminError::Unauthenticated => Self::Api(ApiError::Unauthenticated),
            AdminError::Api(e) => Self::Api(e),
            AdminError::Validation(_)
            | AdminError::InvalidStatusTransition { .. }
            | AdminError::UnsupportedImage(_)
            | AdminError::ImageTooLarge { .. }
            | AdminError::Io(_) => Self::Validation(err.to_string()),
        }
    }
}

/// Admin API client.
///
/// Built from the storefront's [`ApiClient`] once the signed-in user has
/// been checked for the admin role, so no request is ever sent on behalf of
/// a customer account.
#[derive(Debug, Clone)]
pub struct AdminClient {
    api: ApiClient,
    admin: User,
}

impl AdminClient {
    /// Wrap `api` for admin use by `user`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Unauthenticated` if `api` has no session and
    /// `AdminError::Forbidden` if `user` is not an admin.
    pub async fn new(api: ApiClient, user: &User) -> Result<Self, AdminError> {
        if !api.has_token().await {
            return Err(AdminError::Unauthenticated);
        }
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, "Admin access denied");
            return Err(AdminError::Forbidden);
        }
        Ok(Self {
            api,
            admin: user.clone(),
        })
    }

    /// The administrator this client acts for.
    #[must_use]
    pub const fn admin(&self) -> &User {
        &self.admin
    }

    pub(crate) const fn api(&self) -> &ApiClient {
        &self.api
    }
}
