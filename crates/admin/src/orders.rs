//! Order fulfilment.

use scentbox_core::{OrderId, OrderStatus};
use scentbox_storefront::api::{Access, ApiPath, Order};
use tracing::instrument;

use crate::{AdminClient, AdminError, OrderStatusUpdate};

impl AdminClient {
    /// All orders, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AdminError> {
        let query: Vec<(&str, String)> = status
            .map(|s| ("status", s.as_str().to_string()))
            .into_iter()
            .collect();
        let orders: Vec<Order> = self
            .api()
            .get_with_query("/admin/orders", &query, Access::Authenticated)
            .await?;

        // Older backends ignore the filter.
        Ok(match status {
            Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
            None => orders,
        })
    }

    /// Move an order to `status`.
    ///
    /// The order is fetched first; moves outside
    /// `pending → processing → shipped → delivered` (or cancelling before
    /// shipment) are refused without a write.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidStatusTransition` for a disallowed move,
    /// or an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, to = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        let current = self.api().get_order(id).await?;
        check_transition(current.status, status)?;

        let order: Order = self
            .api()
            .put(
                ApiPath::new("/admin/orders").id(id).join("status"),
                &OrderStatusUpdate { status },
                Access::Authenticated,
            )
            .await?;
        tracing::info!(order_id = %id, from = %current.status, to = %order.status, "Order status changed");
        Ok(order)
    }
}

fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), AdminError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AdminError::InvalidStatusTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_moves_allowed() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Processing).is_ok());
        assert!(check_transition(OrderStatus::Processing, OrderStatus::Shipped).is_ok());
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Delivered).is_ok());
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Cancelled).is_ok());
    }

    #[test]
    fn test_backward_and_late_moves_rejected() {
        assert!(matches!(
            check_transition(OrderStatus::Delivered, OrderStatus::Shipped),
            Err(AdminError::InvalidStatusTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Shipped
            })
        ));
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Cancelled).is_err());
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Shipped).is_err());
        assert!(check_transition(OrderStatus::Cancelled, OrderStatus::Pending).is_err());
    }
}
