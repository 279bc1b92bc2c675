//! Integration tests for Scentbox.
//!
//! Every test runs the real storefront and admin clients against a
//! `wiremock` server standing in for the store backend. Nothing leaves the
//! machine and no backend needs to be running.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p scentbox-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api` - Envelope decoding, error mapping, caching
//! - `session` - Sign-in, restore, expiry
//! - `cart` - Cart mirroring and reconciliation
//! - `checkout` - Cash-on-delivery and card orders
//! - `orders` - Order history and cancellation
//! - `admin` - Admin guard, order fulfilment, uploads

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use scentbox_storefront::session::MemoryTokenStore;
use scentbox_storefront::{Storefront, StorefrontConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Password accepted by the mocked sign-in.
pub const PASSWORD: &str = "correct-horse";

/// A JWT whose `exp` claim is long past. Only the payload is ever read.
pub const EXPIRED_JWT: &str = "eyJhbGciOiJIUzI1NiJ9.eyJleHAiOjF9.signature";

/// A mock backend and a scratch session directory.
pub struct TestContext {
    pub server: MockServer,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Path on the mock server for an API path such as `/cart`.
    #[must_use]
    pub fn api_path(path: &str) -> String {
        format!("/api{path}")
    }

    /// Configuration pointing at the mock server.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::for_api_url(&format!("{}/api", self.server.uri()), self.dir.path())
            .unwrap()
    }

    /// A signed-out storefront whose session lives in memory.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(self.config(), Arc::new(MemoryTokenStore::new())).unwrap()
    }

    /// Mount `GET {path}` answering 200 with `body`.
    pub async fn mock_get(&self, api_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(Self::api_path(api_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// A storefront signed in as a user with `role` (`user` or `admin`).
    ///
    /// The server cart starts empty unless the test mounted its own
    /// `GET /cart` first.
    pub async fn signed_in(&self, role: &str) -> Storefront {
        Mock::given(method("POST"))
            .and(path(Self::api_path("/auth/login")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "session-token",
                "user": user_json("u1", role),
            })))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(Self::api_path("/cart")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .with_priority(10)
            .mount(&self.server)
            .await;

        let mut storefront = self.storefront();
        storefront
            .login("asha@example.com", &password())
            .await
            .unwrap();
        storefront
    }
}

#[must_use]
pub fn password() -> SecretString {
    SecretString::from(PASSWORD)
}

#[must_use]
pub fn user_json(id: &str, role: &str) -> Value {
    json!({
        "_id": id,
        "name": "Asha Rao",
        "email": "asha@example.com",
        "role": role,
    })
}

#[must_use]
pub fn product_json(id: &str, name: &str, price: u32, stock: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "brand": { "_id": "b1", "name": "Maison Atar", "slug": "maison-atar" },
        "category": "c1",
        "description": "Eau de parfum",
        "price": price,
        "countInStock": stock,
        "images": [format!("/img/{id}.jpg")],
    })
}

#[must_use]
pub fn address_json(id: &str, is_default: bool) -> Value {
    json!({
        "_id": id,
        "fullName": "Asha Rao",
        "street": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "postalCode": "560001",
        "phone": "9876543210",
        "country": "India",
        "isDefault": is_default,
    })
}

/// An order as the backend returns it.
#[must_use]
pub fn order_json(id: &str, status: &str, payment_method: &str, payment_status: &str) -> Value {
    json!({
        "_id": id,
        "orderNumber": format!("SB-{id}"),
        "orderStatus": status,
        "paymentStatus": payment_status,
        "paymentMethod": payment_method,
        "orderItems": [{
            "product": "p1",
            "name": "Oud Noir",
            "quantity": 2,
            "price": 1500,
        }],
        "shippingAddress": address_json("a1", true),
        "itemsPrice": 3000,
        "shippingPrice": 0,
        "taxPrice": 540,
        "totalPrice": 3540,
        "createdAt": "2026-10-01T10:00:00Z",
    })
}
