//! Integration tests for the local cart and its server mirror.

#![allow(clippy::unwrap_used)]

use scentbox_core::{Money, ProductId};
use scentbox_integration_tests::{TestContext, product_json};
use scentbox_storefront::AppError;
use scentbox_storefront::cart_store::{CartStoreError, SyncOutcome, read_cart_file};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mock_product(ctx: &TestContext, id: &str, stock: u32) {
    ctx.mock_get(&format!("/products/{id}"), product_json(id, "Oud Noir", 1500, stock))
        .await;
}

#[tokio::test]
async fn test_add_requires_sign_in() {
    let ctx = TestContext::start().await;
    mock_product(&ctx, "p1", 5).await;

    let mut storefront = ctx.storefront();
    let err = storefront
        .add_to_cart(&ProductId::new("p1"), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Cart(CartStoreError::Unauthenticated)));
    assert_eq!(err.user_message(), "Please sign in to continue.");
    assert!(storefront.cart().is_empty());
}

#[tokio::test]
async fn test_add_mirrors_to_server_and_saves_locally() {
    let ctx = TestContext::start().await;
    mock_product(&ctx, "p1", 5).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/cart/add")))
        .and(body_json(json!({ "productId": "p1", "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.signed_in("user").await;
    let outcome = storefront
        .add_to_cart(&ProductId::new("p1"), 2)
        .await
        .unwrap();

    assert!(matches!(outcome, SyncOutcome::Synced));
    assert_eq!(storefront.cart().item_count(), 2);

    let saved = read_cart_file(&ctx.config().cart_file()).unwrap();
    assert_eq!(saved.items().len(), 1);
}

#[tokio::test]
async fn test_add_caps_at_stock_and_rejects_sold_out() {
    let ctx = TestContext::start().await;
    mock_product(&ctx, "p1", 3).await;
    mock_product(&ctx, "p2", 0).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/cart/add")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.signed_in("user").await;
    storefront
        .add_to_cart(&ProductId::new("p1"), 10)
        .await
        .unwrap();
    assert_eq!(storefront.cart().get(&ProductId::new("p1")).unwrap().quantity, 3);

    let err = storefront
        .add_to_cart(&ProductId::new("p2"), 1)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Oud Noir is out of stock");
}

#[tokio::test]
async fn test_update_and_remove_use_their_endpoints() {
    let ctx = TestContext::start().await;
    mock_product(&ctx, "p1", 5).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/cart/add")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&ctx.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(TestContext::api_path("/cart/update/p1")))
        .and(body_json(json!({ "quantity": 4 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(TestContext::api_path("/cart/remove/p1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.signed_in("user").await;
    let id = ProductId::new("p1");
    storefront.add_to_cart(&id, 1).await.unwrap();

    let outcome = storefront.cart_mut().update_quantity(&id, 4).await;
    assert!(matches!(outcome, SyncOutcome::Synced));

    // Zero behaves like remove.
    let outcome = storefront.cart_mut().update_quantity(&id, 0).await;
    assert!(matches!(outcome, SyncOutcome::Synced));
    assert!(storefront.cart().is_empty());

    // Nothing left to remove, nothing sent.
    let outcome = storefront.cart_mut().remove(&id).await;
    assert!(matches!(outcome, SyncOutcome::Skipped));
}

#[tokio::test]
async fn test_failed_sync_keeps_local_change_until_reconciled() {
    let ctx = TestContext::start().await;
    mock_product(&ctx, "p1", 5).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/cart/add")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.signed_in("user").await;
    let outcome = storefront
        .add_to_cart(&ProductId::new("p1"), 1)
        .await
        .unwrap();

    assert!(outcome.is_failed());
    assert_eq!(storefront.cart().item_count(), 1);
    assert!(storefront.cart().is_diverged());

    // The server cart holds something else; reconciling adopts it.
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/cart")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "product": product_json("p9", "Vetiver", 900, 10), "quantity": 2 }],
        })))
        .mount(&ctx.server)
        .await;

    let diff = storefront.cart_mut().reconcile().await.unwrap();

    assert_eq!(diff.local_only, vec![ProductId::new("p1")]);
    assert_eq!(diff.server_only, vec![ProductId::new("p9")]);
    assert!(!storefront.cart().is_diverged());
    assert_eq!(storefront.cart().item_count(), 2);
    assert_eq!(
        storefront.cart().get(&ProductId::new("p9")).unwrap().unit_price,
        Money::from_major(900)
    );
}

#[tokio::test]
async fn test_sign_in_adopts_server_cart() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/cart")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "items": [
                    { "product": product_json("p1", "Oud Noir", 1500, 4), "quantity": 1 },
                    { "product": product_json("p1", "Oud Noir", 1500, 4), "quantity": 2 },
                ],
            },
        })))
        .mount(&ctx.server)
        .await;

    let storefront = ctx.signed_in("user").await;

    // Duplicate lines from the server are merged.
    assert_eq!(storefront.cart().items().len(), 1);
    assert_eq!(storefront.cart().item_count(), 3);
}
