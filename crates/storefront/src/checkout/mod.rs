//! Checkout: the async driver around the core transition table, and the
//! payment gateway seam.

mod flow;
mod gateway;

pub use flow::{CheckoutError, CheckoutFlow, Confirmation};
pub use gateway::{ExternalPaymentReference, PaymentError, PaymentGateway, PaymentReceipt};
