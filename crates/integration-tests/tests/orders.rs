//! Integration tests for order history, cancellation and the contact form.

#![allow(clippy::unwrap_used)]

use scentbox_core::{OrderId, OrderStatus};
use scentbox_integration_tests::{TestContext, order_json};
use scentbox_storefront::ApiError;
use scentbox_storefront::api::{ContactRequest, SavedAddress};
use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_order_history_decodes_backend_orders() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    ctx.mock_get(
        "/orders",
        json!({
            "success": true,
            "data": [
                order_json("o2", "shipped", "card", "paid"),
                order_json("o1", "delivered", "cod", "paid"),
            ],
        }),
    )
    .await;

    let orders = storefront.api().list_orders().await.unwrap();

    assert_eq!(orders.len(), 2);
    let first = orders.first().unwrap();
    assert_eq!(first.display_number(), "SB-o2");
    assert_eq!(first.status, OrderStatus::Shipped);
    assert_eq!(first.items.first().unwrap().product.id().as_str(), "p1");
    assert_eq!(
        first.shipping_address.as_ref().map(|a| a.city.as_str()),
        Some("Bengaluru")
    );
}

#[tokio::test]
async fn test_cancel_pending_order() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    ctx.mock_get("/orders/o1", order_json("o1", "pending", "cod", "pending"))
        .await;
    Mock::given(method("PATCH"))
        .and(path(TestContext::api_path("/orders/o1/cancel")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(order_json("o1", "cancelled", "cod", "pending")),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let order = storefront
        .api()
        .cancel_order(&OrderId::new("o1"))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_shipped_order_cannot_be_cancelled() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    ctx.mock_get("/orders/o2", order_json("o2", "shipped", "card", "paid"))
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = storefront
        .api()
        .cancel_order(&OrderId::new("o2"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::BusinessRule(ref m) if m.contains("shipped")));
}

#[tokio::test]
async fn test_saved_addresses_accept_backend_names() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    ctx.mock_get(
        "/addresses",
        json!([
            scentbox_integration_tests::address_json("a1", true),
            { "_id": "a2", "fullName": "", "isDefault": false },
        ]),
    )
    .await;

    let addresses: Vec<SavedAddress> = storefront.api().list_addresses().await.unwrap();

    assert_eq!(addresses.len(), 2);
    let usable: Vec<_> = addresses.iter().filter_map(SavedAddress::validated).collect();
    assert_eq!(usable.len(), 1);
    assert_eq!(usable.first().unwrap().line1, "12 MG Road");
}

#[tokio::test]
async fn test_contact_form_is_public() {
    let ctx = TestContext::start().await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/contact")))
        .and(body_json(json!({
            "name": "Asha",
            "email": "asha@example.com",
            "message": "Is Oud Noir coming back?",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let request = ContactRequest {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        subject: None,
        message: "Is Oud Noir coming back?".to_string(),
    };
    ctx.storefront().api().submit_contact(&request).await.unwrap();
}
