//! Async checkout driver.
//!
//! [`CheckoutFlow`] feeds events into the core [`CheckoutMachine`] and
//! performs the backend calls each step needs. The machine decides what is
//! legal; this type only decides what to send.

use scentbox_core::{
    AddressError, AddressForm, AddressId, Cart, CheckoutEvent, CheckoutMachine, CheckoutStep,
    OrderId, OrderTotals, PaymentMethod, PricingConfig, ShippingAddress, TotalsMismatch, Transition,
    TransitionError,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::gateway::{PaymentError, PaymentGateway};
use crate::api::{
    AddressInput, ApiError, CheckoutBackend, Order, OrderRequest, PaymentConfig, SavedAddress,
};
use crate::error::add_breadcrumb;

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The submitted address failed validation. Every failing field is
    /// listed.
    #[error("invalid address: {}", join_errors(.0))]
    InvalidAddress(Vec<AddressError>),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

fn join_errors(errors: &[AddressError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// The server's order. Its totals are authoritative.
    pub order: Order,
    /// Totals the client showed before the order was placed.
    pub preview: OrderTotals,
    /// Set when the preview disagreed with the server.
    pub mismatch: Option<TotalsMismatch>,
}

/// A card order placed but not yet paid.
#[derive(Debug, Clone)]
struct PendingOrder {
    order: Order,
    ships_to: ShippingAddress,
}

/// One checkout attempt.
#[derive(Debug)]
pub struct CheckoutFlow<B> {
    backend: B,
    machine: CheckoutMachine,
    pricing: PricingConfig,
    address: Option<ShippingAddress>,
    address_id: Option<AddressId>,
    pending_order: Option<PendingOrder>,
    /// Unpaid card orders still to be cancelled on the backend.
    abandoned: Vec<OrderId>,
    payment_config: Option<PaymentConfig>,
}

impl<B: CheckoutBackend> CheckoutFlow<B> {
    pub const fn new(backend: B, pricing: PricingConfig) -> Self {
        Self {
            backend,
            machine: CheckoutMachine::new(),
            pricing,
            address: None,
            address_id: None,
            pending_order: None,
            abandoned: Vec::new(),
            payment_config: None,
        }
    }

    /// Current step.
    pub const fn step(&self) -> CheckoutStep {
        self.machine.step()
    }

    /// The validated shipping address, once there is one.
    pub const fn address(&self) -> Option<&ShippingAddress> {
        self.address.as_ref()
    }

    /// Start checkout. With a usable saved address this skips straight to
    /// payment method selection; an empty cart is ignored.
    ///
    /// # Errors
    ///
    /// Returns a transition error if checkout is already under way.
    pub fn begin(
        &mut self,
        cart: &Cart,
        saved: Option<&SavedAddress>,
    ) -> Result<Transition, CheckoutError> {
        let on_file = saved.and_then(|s| s.validated().map(|address| (s.id.clone(), address)));
        let transition = self.machine.apply(CheckoutEvent::Begin {
            has_items: !cart.is_empty(),
            has_valid_address: on_file.is_some(),
        })?;

        if transition != Transition::Ignored {
            if let Some((id, address)) = on_file {
                self.address = Some(address);
                self.address_id = Some(id);
            }
            add_breadcrumb("checkout", "Checkout started", None);
        }
        Ok(transition)
    }

    /// Submit a new shipping address. An unpaid card order for the previous
    /// address is dropped and cancelled before the next order is placed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidAddress`] with every failing field;
    /// the flow stays on address collection.
    pub fn submit_address(&mut self, form: &AddressForm) -> Result<&ShippingAddress, CheckoutError> {
        match form.validate() {
            Ok(address) => {
                self.machine.apply(CheckoutEvent::AddressAccepted)?;
                self.address_id = None;
                self.abandon_pending();
                Ok(self.address.insert(address))
            }
            Err(errors) => {
                self.machine.apply(CheckoutEvent::AddressRejected)?;
                Err(CheckoutError::InvalidAddress(errors))
            }
        }
    }

    /// Go back from method selection to change the address.
    ///
    /// # Errors
    ///
    /// Returns a transition error outside method selection.
    pub fn edit_address(&mut self) -> Result<(), CheckoutError> {
        self.machine.apply(CheckoutEvent::EditAddress)?;
        self.address = None;
        self.address_id = None;
        self.abandon_pending();
        Ok(())
    }

    /// Place a cash-on-delivery order. Clears `cart` on success.
    ///
    /// An unpaid card order from an earlier attempt is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the flow goes back to method selection.
    #[instrument(skip(self, cart), fields(lines = cart.items().len()))]
    pub async fn place_cod_order(&mut self, cart: &mut Cart) -> Result<Confirmation, CheckoutError> {
        self.machine.apply(CheckoutEvent::MethodChosen)?;
        add_breadcrumb("checkout", "Cash on delivery chosen", None);

        let preview = cart.totals(&self.pricing, None);
        match self.place_cash_order(cart, &preview).await {
            Ok(order) => {
                self.machine.apply(CheckoutEvent::PaymentSucceeded)?;
                cart.clear();
                Ok(self.confirm(order, preview))
            }
            Err(e) => {
                warn!(error = %e, "Cash on delivery order failed");
                self.machine.apply(CheckoutEvent::CashOrderFailed)?;
                Err(e)
            }
        }
    }

    /// Pay by card through `gateway`. Clears `cart` on success.
    ///
    /// After a failure the address and the pending order are kept, so a
    /// retry only creates a new payment intent.
    ///
    /// # Errors
    ///
    /// Returns the gateway or backend error; the flow moves to
    /// `PaymentFailed`.
    #[instrument(skip(self, cart, gateway), fields(lines = cart.items().len()))]
    pub async fn pay_by_card<G: PaymentGateway>(
        &mut self,
        cart: &mut Cart,
        gateway: &G,
    ) -> Result<Confirmation, CheckoutError> {
        self.machine.apply(CheckoutEvent::MethodChosen)?;
        add_breadcrumb("checkout", "Card payment started", None);

        let preview = cart.totals(&self.pricing, None);
        match self.collect_card_payment(cart, gateway, &preview).await {
            Ok(order) => {
                self.machine.apply(CheckoutEvent::PaymentSucceeded)?;
                self.pending_order = None;
                cart.clear();
                Ok(self.confirm(order, preview))
            }
            Err(e) => {
                warn!(error = %e, "Card payment failed");
                add_breadcrumb("checkout", "Card payment failed", None);
                self.machine.apply(CheckoutEvent::PaymentFailed)?;
                Err(e)
            }
        }
    }

    /// Back to method selection after a failed payment.
    ///
    /// # Errors
    ///
    /// Returns a transition error unless the last payment failed.
    pub fn retry(&mut self) -> Result<(), CheckoutError> {
        self.machine.apply(CheckoutEvent::Retry)?;
        Ok(())
    }

    /// Abandon checkout and cancel the unpaid card order, if any.
    ///
    /// The backend cancellation is best effort: when it fails the order id
    /// is kept and cancelled again before this flow places another order.
    ///
    /// # Errors
    ///
    /// Returns a transition error from the cart or a finished checkout.
    pub async fn cancel(&mut self) -> Result<(), CheckoutError> {
        self.machine.apply(CheckoutEvent::Cancel)?;
        self.abandon_pending();
        if let Err(e) = self.cancel_abandoned().await {
            warn!(error = %e, orders = self.abandoned.len(), "Unpaid card order not cancelled");
        }
        add_breadcrumb("checkout", "Checkout cancelled", None);
        Ok(())
    }

    async fn place_cash_order(
        &mut self,
        cart: &Cart,
        preview: &OrderTotals,
    ) -> Result<Order, CheckoutError> {
        self.abandon_pending();
        self.cancel_abandoned().await?;
        self.create_order(cart, PaymentMethod::CashOnDelivery, preview)
            .await
    }

    async fn collect_card_payment<G: PaymentGateway>(
        &mut self,
        cart: &Cart,
        gateway: &G,
        preview: &OrderTotals,
    ) -> Result<Order, CheckoutError> {
        let reusable = self
            .pending_order
            .as_ref()
            .filter(|pending| self.address.as_ref() == Some(&pending.ships_to))
            .map(|pending| pending.order.clone());
        let order = if let Some(order) = reusable {
            order
        } else {
            self.abandon_pending();
            self.cancel_abandoned().await?;
            let ships_to = self
                .address
                .clone()
                .ok_or(TransitionError::AddressRequired)?;
            let order = self.create_order(cart, PaymentMethod::Card, preview).await?;
            self.pending_order = Some(PendingOrder {
                order: order.clone(),
                ships_to,
            });
            order
        };

        let config = match &self.payment_config {
            Some(config) => config.clone(),
            None => {
                let config = self.backend.payment_config().await?;
                self.payment_config.insert(config).clone()
            }
        };

        let intent = self
            .backend
            .create_payment_intent(&order.id, order.totals.total)
            .await?;
        let receipt = gateway.collect_payment(&intent, &config).await?;
        let confirmed = self
            .backend
            .confirm_payment(&order.id, &receipt.payment_intent_id)
            .await?;
        Ok(confirmed)
    }

    fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending_order.take() {
            self.abandoned.push(pending.order.id);
        }
    }

    /// Cancel unpaid card orders this flow no longer pays for. Orders the
    /// backend will not cancel any more are dropped with a warning.
    async fn cancel_abandoned(&mut self) -> Result<(), ApiError> {
        while let Some(order_id) = self.abandoned.last().cloned() {
            match self.backend.cancel_order(&order_id).await {
                Ok(_) => info!(%order_id, "Unpaid card order cancelled"),
                Err(ApiError::BusinessRule(message) | ApiError::NotFound(message)) => {
                    warn!(%order_id, %message, "Unpaid card order left as is");
                }
                Err(e) => return Err(e),
            }
            self.abandoned.pop();
        }
        Ok(())
    }

    async fn create_order(
        &mut self,
        cart: &Cart,
        method: PaymentMethod,
        preview: &OrderTotals,
    ) -> Result<Order, CheckoutError> {
        let address = self
            .address
            .clone()
            .ok_or(TransitionError::AddressRequired)?;
        let address_id = self.ensure_address(&address).await?;

        let request = OrderRequest::new(cart, &address, Some(&address_id), method, preview);
        Ok(self.backend.create_order(&request).await?)
    }

    async fn ensure_address(&mut self, address: &ShippingAddress) -> Result<AddressId, ApiError> {
        if let Some(id) = &self.address_id {
            return Ok(id.clone());
        }
        let saved = self
            .backend
            .create_address(&AddressInput {
                address: address.clone().into(),
                is_default: false,
            })
            .await?;
        Ok(self.address_id.insert(saved.id).clone())
    }

    fn confirm(&self, order: Order, preview: OrderTotals) -> Confirmation {
        let mismatch = preview.compare(&order.totals);
        if let Some(mismatch) = &mismatch {
            warn!(order_id = %order.id, %mismatch, "Server totals differ from preview");
        }
        info!(
            order_id = %order.id,
            total = %order.totals.total,
            step = %self.machine.step(),
            "Order confirmed"
        );
        add_breadcrumb(
            "checkout",
            "Order confirmed",
            Some(&[("order_id", order.id.as_str())]),
        );
        Confirmation {
            order,
            preview,
            mismatch,
        }
    }
}
