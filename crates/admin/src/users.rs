//! Account management.

use scentbox_core::{UserId, UserRole};
use scentbox_storefront::api::{Access, ApiPath, User};
use serde::de::IgnoredAny;
use tracing::instrument;

use crate::{AdminClient, AdminError, UserRoleUpdate};

impl AdminClient {
    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.api().get("/admin/users", Access::Authenticated).await?)
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` when demoting yourself, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(user_id = %id, role = %role))]
    pub async fn set_user_role(&self, id: &UserId, role: UserRole) -> Result<User, AdminError> {
        if *id == self.admin().id && role != UserRole::Admin {
            return Err(AdminError::Validation(
                "you cannot remove your own admin role".to_string(),
            ));
        }

        let user: User = self
            .api()
            .put(
                ApiPath::new("/admin/users").id(id).join("role"),
                &UserRoleUpdate { role },
                Access::Authenticated,
            )
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User role changed");
        Ok(user)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` when deleting yourself, or an error
    /// if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), AdminError> {
        if *id == self.admin().id {
            return Err(AdminError::Validation(
                "you cannot delete your own account".to_string(),
            ));
        }

        let _: IgnoredAny = self
            .api()
            .delete(ApiPath::new("/admin/users").id(id), Access::Authenticated)
            .await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
