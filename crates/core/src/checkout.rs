//! Checkout step transition table.
//!
//! ```text
//! Cart ──begin──▶ AddressCollection ──address accepted──▶ PaymentMethodSelection
//!   │                                                       │        ▲
//!   └──begin (address on file)──────────────────────────────┘        │
//!                                                method chosen        │ cash order failed / retry
//!                                                           ▼        │
//!                        OrderConfirmed ◀──succeeded── PaymentProcessing ──failed──▶ PaymentFailed
//! ```
//!
//! This module holds only the legal moves. Side effects (creating
//! addresses and orders, talking to the payment gateway) belong to the
//! driver in the storefront crate, which feeds events in here and is
//! therefore unable to skip a step.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Where the customer is in checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    AddressCollection,
    PaymentMethodSelection,
    PaymentProcessing,
    OrderConfirmed,
    PaymentFailed,
}

impl CheckoutStep {
    /// Snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::AddressCollection => "address_collection",
            Self::PaymentMethodSelection => "payment_method_selection",
            Self::PaymentProcessing => "payment_processing",
            Self::OrderConfirmed => "order_confirmed",
            Self::PaymentFailed => "payment_failed",
        }
    }

    /// Whether checkout has finished successfully.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::OrderConfirmed)
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the checkout machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// The checkout button was pressed.
    Begin {
        has_items: bool,
        has_valid_address: bool,
    },
    /// A submitted address passed validation.
    AddressAccepted,
    /// A submitted address failed validation.
    AddressRejected,
    /// Go back from method selection to edit the address.
    EditAddress,
    /// A payment method was picked.
    MethodChosen,
    /// The order was placed (and paid, for card).
    PaymentSucceeded,
    /// Cash-on-delivery order placement failed; the customer picks again.
    CashOrderFailed,
    /// The gateway or the backend rejected a card payment.
    PaymentFailed,
    /// Try again after a failed payment.
    Retry,
    /// Abandon checkout and go back to the cart.
    Cancel,
}

impl CheckoutEvent {
    const fn name(self) -> &'static str {
        match self {
            Self::Begin { .. } => "begin",
            Self::AddressAccepted => "address_accepted",
            Self::AddressRejected => "address_rejected",
            Self::EditAddress => "edit_address",
            Self::MethodChosen => "method_chosen",
            Self::PaymentSucceeded => "payment_succeeded",
            Self::CashOrderFailed => "cash_order_failed",
            Self::PaymentFailed => "payment_failed",
            Self::Retry => "retry",
            Self::Cancel => "cancel",
        }
    }
}

/// Illegal moves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The event is not valid in the current step.
    #[error("cannot apply {event} during {from}")]
    InvalidTransition {
        from: CheckoutStep,
        event: &'static str,
    },
    /// Payment was requested without a validated address.
    #[error("a validated shipping address is required before payment")]
    AddressRequired,
}

/// Result of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The step changed (or was re-entered, for a rejected address).
    Moved {
        from: CheckoutStep,
        to: CheckoutStep,
    },
    /// The event was deliberately ignored (checkout on an empty cart).
    Ignored,
}

/// The checkout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutMachine {
    step: CheckoutStep,
    address_validated: bool,
}

impl CheckoutMachine {
    /// A machine sitting on the cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: CheckoutStep::Cart,
            address_validated: false,
        }
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Whether a validated address is on file for this checkout.
    #[must_use]
    pub const fn has_validated_address(&self) -> bool {
        self.address_validated
    }

    /// Apply an event.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] for moves the table
    /// does not allow and [`TransitionError::AddressRequired`] if payment
    /// would start without a validated address. The machine is unchanged on
    /// error.
    pub fn apply(&mut self, event: CheckoutEvent) -> Result<Transition, TransitionError> {
        use CheckoutEvent as E;
        use CheckoutStep as S;

        let from = self.step;
        let to = match (from, event) {
            (
                S::Cart,
                E::Begin {
                    has_items: false, ..
                },
            ) => return Ok(Transition::Ignored),
            (
                S::Cart,
                E::Begin {
                    has_valid_address: true,
                    ..
                },
            ) => {
                self.address_validated = true;
                S::PaymentMethodSelection
            }
            (S::Cart, E::Begin { .. }) => {
                self.address_validated = false;
                S::AddressCollection
            }
            (S::AddressCollection, E::AddressAccepted) => {
                self.address_validated = true;
                S::PaymentMethodSelection
            }
            (S::AddressCollection, E::AddressRejected) => S::AddressCollection,
            (S::PaymentMethodSelection, E::EditAddress) => {
                self.address_validated = false;
                S::AddressCollection
            }
            (S::PaymentMethodSelection, E::MethodChosen) => {
                if !self.address_validated {
                    return Err(TransitionError::AddressRequired);
                }
                S::PaymentProcessing
            }
            (S::PaymentProcessing, E::PaymentSucceeded) => S::OrderConfirmed,
            (S::PaymentProcessing, E::CashOrderFailed) | (S::PaymentFailed, E::Retry) => {
                S::PaymentMethodSelection
            }
            (S::PaymentProcessing, E::PaymentFailed) => S::PaymentFailed,
            (S::AddressCollection | S::PaymentMethodSelection | S::PaymentFailed, E::Cancel) => {
                S::Cart
            }
            _ => {
                return Err(TransitionError::InvalidTransition {
                    from,
                    event: event.name(),
                });
            }
        };

        self.step = to;
        Ok(Transition::Moved { from, to })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BEGIN_NO_ADDRESS: CheckoutEvent = CheckoutEvent::Begin {
        has_items: true,
        has_valid_address: false,
    };

    #[test]
    fn test_empty_cart_checkout_is_noop() {
        let mut machine = CheckoutMachine::new();
        let result = machine.apply(CheckoutEvent::Begin {
            has_items: false,
            has_valid_address: true,
        });
        assert_eq!(result, Ok(Transition::Ignored));
        assert_eq!(machine.step(), CheckoutStep::Cart);
    }

    #[test]
    fn test_happy_path_without_address_on_file() {
        let mut machine = CheckoutMachine::new();
        machine.apply(BEGIN_NO_ADDRESS).unwrap();
        assert_eq!(machine.step(), CheckoutStep::AddressCollection);

        machine.apply(CheckoutEvent::AddressRejected).unwrap();
        assert_eq!(machine.step(), CheckoutStep::AddressCollection);

        machine.apply(CheckoutEvent::AddressAccepted).unwrap();
        machine.apply(CheckoutEvent::MethodChosen).unwrap();
        assert_eq!(machine.step(), CheckoutStep::PaymentProcessing);

        machine.apply(CheckoutEvent::PaymentSucceeded).unwrap();
        assert_eq!(machine.step(), CheckoutStep::OrderConfirmed);
        assert!(machine.step().is_terminal());
    }

    #[test]
    fn test_address_on_file_skips_collection() {
        let mut machine = CheckoutMachine::new();
        let transition = machine
            .apply(CheckoutEvent::Begin {
                has_items: true,
                has_valid_address: true,
            })
            .unwrap();
        assert_eq!(
            transition,
            Transition::Moved {
                from: CheckoutStep::Cart,
                to: CheckoutStep::PaymentMethodSelection
            }
        );
    }

    #[test]
    fn test_never_processes_without_validated_address() {
        let mut machine = CheckoutMachine::new();
        machine
            .apply(CheckoutEvent::Begin {
                has_items: true,
                has_valid_address: true,
            })
            .unwrap();
        machine.apply(CheckoutEvent::EditAddress).unwrap();
        assert!(!machine.has_validated_address());

        // Cannot jump to payment from address collection.
        assert!(matches!(
            machine.apply(CheckoutEvent::MethodChosen),
            Err(TransitionError::InvalidTransition { .. })
        ));
        assert_eq!(machine.step(), CheckoutStep::AddressCollection);

        // Cannot start processing from the cart either.
        let mut fresh = CheckoutMachine::new();
        assert!(fresh.apply(CheckoutEvent::MethodChosen).is_err());
        assert_eq!(fresh.step(), CheckoutStep::Cart);
    }

    #[test]
    fn test_cash_failure_returns_to_method_selection() {
        let mut machine = CheckoutMachine::new();
        machine.apply(BEGIN_NO_ADDRESS).unwrap();
        machine.apply(CheckoutEvent::AddressAccepted).unwrap();
        machine.apply(CheckoutEvent::MethodChosen).unwrap();

        machine.apply(CheckoutEvent::CashOrderFailed).unwrap();
        assert_eq!(machine.step(), CheckoutStep::PaymentMethodSelection);
        assert!(machine.has_validated_address());
    }

    #[test]
    fn test_card_failure_retry_and_cancel() {
        let mut machine = CheckoutMachine::new();
        machine.apply(BEGIN_NO_ADDRESS).unwrap();
        machine.apply(CheckoutEvent::AddressAccepted).unwrap();
        machine.apply(CheckoutEvent::MethodChosen).unwrap();
        machine.apply(CheckoutEvent::PaymentFailed).unwrap();
        assert_eq!(machine.step(), CheckoutStep::PaymentFailed);

        machine.apply(CheckoutEvent::Retry).unwrap();
        assert_eq!(machine.step(), CheckoutStep::PaymentMethodSelection);

        machine.apply(CheckoutEvent::MethodChosen).unwrap();
        machine.apply(CheckoutEvent::PaymentFailed).unwrap();
        machine.apply(CheckoutEvent::Cancel).unwrap();
        assert_eq!(machine.step(), CheckoutStep::Cart);
    }

    #[test]
    fn test_confirmed_is_terminal() {
        let mut machine = CheckoutMachine::new();
        machine.apply(BEGIN_NO_ADDRESS).unwrap();
        machine.apply(CheckoutEvent::AddressAccepted).unwrap();
        machine.apply(CheckoutEvent::MethodChosen).unwrap();
        machine.apply(CheckoutEvent::PaymentSucceeded).unwrap();

        for event in [CheckoutEvent::Cancel, CheckoutEvent::Retry, BEGIN_NO_ADDRESS] {
            assert!(machine.apply(event).is_err());
        }
        assert_eq!(machine.step(), CheckoutStep::OrderConfirmed);
    }

    #[test]
    fn test_cannot_cancel_while_processing() {
        let mut machine = CheckoutMachine::new();
        machine.apply(BEGIN_NO_ADDRESS).unwrap();
        machine.apply(CheckoutEvent::AddressAccepted).unwrap();
        machine.apply(CheckoutEvent::MethodChosen).unwrap();

        let err = machine.apply(CheckoutEvent::Cancel).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot apply cancel during payment_processing"
        );
    }
}
