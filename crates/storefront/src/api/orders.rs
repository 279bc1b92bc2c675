//! Order endpoints.

use scentbox_core::OrderId;
use tracing::instrument;

use super::client::{Access, ApiClient, ApiPath};
use super::types::{Order, OrderRequest};
use super::ApiError;

impl ApiClient {
    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BusinessRule` if the server refuses the order (stock,
    /// address), or an error if the API request fails.
    #[instrument(skip(self, request), fields(payment_method = %request.payment_method, lines = request.line_count()))]
    pub async fn create_order(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        let order: Order = self.post("/orders", request, Access::Authenticated).await?;
        tracing::info!(order_id = %order.id, total = %order.totals.total, "Order created");
        Ok(order)
    }

    /// The signed-in customer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no session or the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders", Access::Authenticated).await
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or an error if the API
    /// request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        self.get(ApiPath::new("/orders").id(id), Access::Authenticated).await
    }

    /// Cancel an order that has not shipped yet.
    ///
    /// The order is fetched first and the cancellation refused locally when
    /// its status no longer allows it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BusinessRule` if the order is shipped, delivered or
    /// already cancelled, or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Order, ApiError> {
        let order = self.get_order(id).await?;
        if !order.status.is_cancellable() {
            return Err(ApiError::BusinessRule(format!(
                "cannot cancel {} order",
                order.status
            )));
        }

        let order: Order = self
            .patch(
                ApiPath::new("/orders").id(id).join("cancel"),
                &serde_json::json!({}),
                Access::Authenticated,
            )
            .await?;
        tracing::info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }
}
