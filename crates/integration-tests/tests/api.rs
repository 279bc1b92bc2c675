//! Integration tests for the REST gateway: envelopes, errors and caching.

#![allow(clippy::unwrap_used)]

use scentbox_core::{Money, ProductId};
use scentbox_integration_tests::{TestContext, product_json};
use scentbox_storefront::api::ProductQuery;
use scentbox_storefront::{ApiError, AppError, ErrorKind};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// =============================================================================
// Envelopes
// =============================================================================

#[tokio::test]
async fn test_wrapped_and_bare_responses_decode_alike() {
    let ctx = TestContext::start().await;
    ctx.mock_get(
        "/products/p1",
        json!({ "success": true, "data": product_json("p1", "Oud Noir", 1500, 4) }),
    )
    .await;
    ctx.mock_get("/products/p2", product_json("p2", "Santal Blanc", 2400, 0))
        .await;

    let storefront = ctx.storefront();
    let wrapped = storefront.api().get_product(&ProductId::new("p1")).await.unwrap();
    let bare = storefront.api().get_product(&ProductId::new("p2")).await.unwrap();

    assert_eq!(wrapped.name, "Oud Noir");
    assert_eq!(wrapped.price, Money::from_major(1500));
    assert_eq!(wrapped.brand_name(), Some("Maison Atar"));
    assert_eq!(bare.name, "Santal Blanc");
    assert!(!bare.in_stock());
}

#[tokio::test]
async fn test_product_listing_passes_filters() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products")))
        .and(query_param("search", "oud"))
        .and(query_param("sort", "price_asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Oud Noir", 1500, 4)],
            "page": 1,
            "pages": 1,
            "total": 1,
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let query = ProductQuery {
        search: Some("oud".to_string()),
        sort: Some("price_asc".to_string()),
        ..ProductQuery::default()
    };
    let page = ctx.storefront().api().list_products(&query).await.unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.products.first().map(|p| p.id.as_str()), Some("p1"));
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_error_statuses_map_to_taxonomy() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products/missing")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Product not found" })),
        )
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products/broken")))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace"))
        .mount(&ctx.server)
        .await;

    let storefront = ctx.storefront();

    let err = storefront
        .api()
        .get_product(&ProductId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref m) if m == "Product not found"));

    let err = storefront
        .api()
        .get_product(&ProductId::new("broken"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));

    // Server internals never reach the user.
    let app: AppError = err.into();
    assert_eq!(app.kind(), ErrorKind::Network);
    assert!(!app.user_message().contains("stack trace"));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/categories")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&ctx.server)
        .await;

    let err = ctx.storefront().api().categories().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)));
}

#[tokio::test]
async fn test_unexpected_shape_is_decode_error() {
    let ctx = TestContext::start().await;
    ctx.mock_get("/brands", json!({ "data": { "unexpected": true } }))
        .await;

    let err = ctx.storefront().api().brands().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_catalog_reads_are_cached() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/categories")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "c1", "name": "Eau de Parfum", "slug": "edp" },
        ])))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let storefront = ctx.storefront();
    let first = storefront.api().categories().await.unwrap();
    let second = storefront.api().categories().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
}

#[tokio::test]
async fn test_search_skips_cache() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&ctx.server)
        .await;

    let storefront = ctx.storefront();
    let query = ProductQuery {
        search: Some("vetiver".to_string()),
        ..ProductQuery::default()
    };
    storefront.api().list_products(&query).await.unwrap();
    storefront.api().list_products(&query).await.unwrap();
}

#[tokio::test]
async fn test_invalidated_product_is_refetched() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products/p1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_json("p1", "Oud Noir", 1500, 4)),
        )
        .expect(2)
        .mount(&ctx.server)
        .await;

    let storefront = ctx.storefront();
    let id = ProductId::new("p1");
    storefront.api().get_product(&id).await.unwrap();
    storefront.api().get_product(&id).await.unwrap();
    storefront.api().invalidate_product(&id).await;
    storefront.api().get_product(&id).await.unwrap();
}
