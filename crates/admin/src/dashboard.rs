//! Dashboard statistics.

use scentbox_storefront::api::Access;
use tracing::instrument;

use crate::{AdminClient, AdminError, DashboardStats};

impl AdminClient {
    /// Store-wide counts, revenue, recent orders and low-stock products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardStats, AdminError> {
        let stats: DashboardStats = self
            .api()
            .get("/admin/dashboard", Access::Authenticated)
            .await?;
        tracing::debug!(
            orders = stats.total_orders,
            low_stock = stats.low_stock_products.len(),
            "Fetched dashboard"
        );
        Ok(stats)
    }
}
