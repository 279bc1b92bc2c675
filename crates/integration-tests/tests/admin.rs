//! Integration tests for the admin client.

#![allow(clippy::unwrap_used)]

use scentbox_admin::{AdminClient, AdminError, ProductInput};
use scentbox_core::{Money, OrderId, OrderStatus, ProductId, UserId, UserRole};
use scentbox_integration_tests::{TestContext, order_json, product_json, user_json};
use scentbox_storefront::{AppError, ErrorKind};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn admin_client(ctx: &TestContext) -> AdminClient {
    let storefront = ctx.signed_in("admin").await;
    let user = storefront.current_user().await.unwrap().clone();
    AdminClient::new(storefront.api().clone(), &user).await.unwrap()
}

// =============================================================================
// Guard
// =============================================================================

#[tokio::test]
async fn test_customer_cannot_open_admin_client() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    Mock::given(path(TestContext::api_path("/admin/dashboard")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let user = storefront.current_user().await.unwrap().clone();
    let err = AdminClient::new(storefront.api().clone(), &user)
        .await
        .unwrap_err();

    assert!(matches!(err, AdminError::Forbidden));
    assert_eq!(AppError::from(err).kind(), ErrorKind::Auth);
}

#[tokio::test]
async fn test_backend_forbidden_is_surfaced() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/admin/users")))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Admin access required" })),
        )
        .mount(&ctx.server)
        .await;

    let err = admin.list_users().await.unwrap_err();
    let app = AppError::from(err);

    assert_eq!(app.kind(), ErrorKind::Auth);
    assert_eq!(app.user_message(), "You do not have permission to do that.");
}

// =============================================================================
// Dashboard and Users
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    ctx.mock_get(
        "/admin/dashboard",
        json!({
            "success": true,
            "data": {
                "totalUsers": 42,
                "totalProducts": 18,
                "totalOrders": 7,
                "totalRevenue": 25480.5,
                "recentOrders": [order_json("o1", "pending", "cod", "pending")],
                "lowStock": [product_json("p1", "Oud Noir", 1500, 2)],
            },
        }),
    )
    .await;

    let stats = admin.dashboard().await.unwrap();

    assert_eq!(stats.total_users, 42);
    assert_eq!(stats.total_revenue, Money::from_minor(2_548_050));
    assert_eq!(stats.recent_orders.len(), 1);
    assert_eq!(stats.low_stock_products.len(), 1);
}

#[tokio::test]
async fn test_set_role_and_self_demotion_guard() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    Mock::given(method("PUT"))
        .and(path(TestContext::api_path("/admin/users/u2/role")))
        .and(body_json(json!({ "role": "admin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("u2", "admin")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let user = admin
        .set_user_role(&UserId::new("u2"), UserRole::Admin)
        .await
        .unwrap();
    assert!(user.is_admin());

    // The signed-in admin is u1.
    let err = admin
        .set_user_role(&UserId::new("u1"), UserRole::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));

    let err = admin.delete_user(&UserId::new("u1")).await.unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_order_status_moves_forward() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    ctx.mock_get("/orders/o1", order_json("o1", "pending", "cod", "pending"))
        .await;
    Mock::given(method("PUT"))
        .and(path(TestContext::api_path("/admin/orders/o1/status")))
        .and(body_json(json!({ "status": "processing" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(order_json("o1", "processing", "cod", "pending")),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let order = admin
        .update_order_status(&OrderId::new("o1"), OrderStatus::Processing)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_delivered_order_cannot_move_back() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    ctx.mock_get("/orders/o1", order_json("o1", "delivered", "cod", "paid"))
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let err = admin
        .update_order_status(&OrderId::new("o1"), OrderStatus::Processing)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AdminError::InvalidStatusTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Processing,
        }
    ));
    assert_eq!(
        AppError::from(err).user_message(),
        "Cannot change order status from delivered to processing"
    );
}

#[tokio::test]
async fn test_order_list_filters_by_status() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    // A backend that ignores the filter.
    ctx.mock_get(
        "/admin/orders",
        json!([
            order_json("o1", "pending", "cod", "pending"),
            order_json("o2", "shipped", "card", "paid"),
        ]),
    )
    .await;

    let orders = admin.list_orders(Some(OrderStatus::Shipped)).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders.first().unwrap().id.as_str(), "o2");
}

// =============================================================================
// Products and Uploads
// =============================================================================

#[tokio::test]
async fn test_product_changes_refresh_the_catalog_cache() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("admin").await;
    let user = storefront.current_user().await.unwrap().clone();
    let admin = AdminClient::new(storefront.api().clone(), &user).await.unwrap();
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/products/p1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_json("p1", "Oud Noir", 1500, 4)),
        )
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("PUT"))
        .and(path(TestContext::api_path("/admin/products/p1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(product_json("p1", "Oud Noir", 1800, 4)),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let id = ProductId::new("p1");
    let product = storefront.api().get_product(&id).await.unwrap();
    let input = ProductInput {
        price: Money::from_major(1800),
        ..ProductInput::from(&product)
    };
    admin.update_product(&id, &input).await.unwrap();

    // Served from the network again, not the stale cache.
    storefront.api().get_product(&id).await.unwrap();
}

#[tokio::test]
async fn test_invalid_product_is_not_sent() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/admin/products")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let input = ProductInput {
        name: "Santal Blanc".to_string(),
        price: Money::from_major(2400),
        stock: -1,
        ..ProductInput::default()
    };
    let err = admin.create_product(&input).await.unwrap_err();

    assert!(matches!(err, AdminError::Validation(ref m) if m.contains("stock")));
}

#[tokio::test]
async fn test_image_upload() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/upload/product-image")))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("fake-png-bytes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "imageUrl": "/uploads/bottle-1.png" })),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let file = ctx.dir.path().join("bottle.png");
    std::fs::write(&file, b"fake-png-bytes").unwrap();
    let url = admin.upload_image(&file).await.unwrap();
    assert_eq!(url, "/uploads/bottle-1.png");

    let gif = ctx.dir.path().join("bottle.gif");
    std::fs::write(&gif, b"GIF89a").unwrap();
    let err = admin.upload_image(&gif).await.unwrap_err();
    assert!(matches!(err, AdminError::UnsupportedImage(_)));
}

#[tokio::test]
async fn test_messages_newest_first() {
    let ctx = TestContext::start().await;
    let admin = admin_client(&ctx).await;
    ctx.mock_get(
        "/contact",
        json!([
            {
                "_id": "m1",
                "name": "Ravi",
                "email": "ravi@example.com",
                "message": "Older",
                "createdAt": "2026-09-01T08:00:00Z",
            },
            {
                "_id": "m2",
                "name": "Asha",
                "email": "asha@example.com",
                "subject": "Restock",
                "message": "Newer",
                "createdAt": "2026-10-01T08:00:00Z",
            },
        ]),
    )
    .await;

    let messages = admin.list_messages().await.unwrap();
    let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["m2", "m1"]);
}
