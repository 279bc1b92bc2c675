//! Core types for Scentbox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use address::{AddressError, AddressField, AddressForm, PhoneNumber, PostalCode, ShippingAddress};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Money;
pub use status::*;
