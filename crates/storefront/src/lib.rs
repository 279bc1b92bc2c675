//! Scentbox storefront client.
//!
//! Talks to the store's REST backend: catalog browsing, a local-first cart
//! that mirrors itself to the server, sign-in with a persisted session, and
//! a checkout flow for cash-on-delivery and card orders.
//!
//! [`state::Storefront`] ties the pieces together for front ends such as
//! the `sb` command-line tool.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart_store;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;

pub use api::{ApiClient, ApiError};
pub use config::StorefrontConfig;
pub use error::{AppError, ErrorKind};
pub use state::Storefront;
