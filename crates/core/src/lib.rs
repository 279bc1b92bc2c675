//! Scentbox Core - Shared domain library.
//!
//! This crate provides the domain types and rules used across all Scentbox
//! components:
//! - `storefront` - Customer-facing client (catalog, cart, checkout)
//! - `admin` - Administration client (dashboard, users, products, orders)
//! - `cli` - Command-line front end for both
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Cart mutation, pricing and the checkout transition
//! table can therefore be unit tested without a network or a UI.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, statuses and addresses
//! - [`cart`] - Line items and the cart collection
//! - [`pricing`] - Order total calculation
//! - [`checkout`] - Checkout step transition table

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod pricing;
pub mod types;

pub use cart::{Cart, CartChange, CartDiff, CartError, LineItem, ProductSnapshot, QuantityMismatch};
pub use checkout::{CheckoutEvent, CheckoutMachine, CheckoutStep, Transition, TransitionError};
pub use pricing::{
    Discount, FieldMismatch, OrderTotals, PricingConfig, PricingError, TotalsMismatch,
    calculate_totals,
};
pub use types::*;
