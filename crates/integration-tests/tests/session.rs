//! Integration tests for sign-in, session restore and expiry.

#![allow(clippy::unwrap_used)]

use scentbox_integration_tests::{EXPIRED_JWT, TestContext, password, user_json};
use scentbox_storefront::session::SessionError;
use scentbox_storefront::{ApiError, AppError, Storefront};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn write_session(ctx: &TestContext, token: &str) {
    let session = json!({ "token": token, "user": user_json("u1", "user") });
    std::fs::write(
        ctx.dir.path().join("session.json"),
        serde_json::to_vec(&session).unwrap(),
    )
    .unwrap();
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_login_sends_credentials_and_attaches_token() {
    let ctx = TestContext::start().await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/auth/login")))
        .and(body_json(json!({ "email": "asha@example.com", "password": "correct-horse" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "token": "tok-1", "user": user_json("u1", "user") },
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/cart")))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    let user = storefront
        .login("  Asha@Example.com ", &password())
        .await
        .unwrap();

    assert_eq!(user.id.as_str(), "u1");
    assert_eq!(storefront.current_user().await.map(|u| u.name.as_str()), Some("Asha Rao"));
}

#[tokio::test]
async fn test_wrong_password_is_reported_without_signing_in() {
    let ctx = TestContext::start().await;
    Mock::given(method("POST"))
        .and(path(TestContext::api_path("/auth/login")))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Invalid email or password" })),
        )
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    let err = storefront
        .login("asha@example.com", &password())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Session(SessionError::Api(ApiError::Unauthorized(_)))
    ));
    assert_eq!(err.user_message(), "Invalid email or password");
    assert!(storefront.current_user().await.is_none());
}

#[tokio::test]
async fn test_weak_password_never_reaches_the_server() {
    let ctx = TestContext::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let mut storefront = ctx.storefront();
    let err = storefront
        .login("asha@example.com", &SecretString::from("123"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Session(SessionError::WeakPassword)));
}

// =============================================================================
// Restore
// =============================================================================

#[tokio::test]
async fn test_open_restores_live_session() {
    let ctx = TestContext::start().await;
    write_session(&ctx, "tok-live");
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/auth/me")))
        .and(header("Authorization", "Bearer tok-live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("u1", "admin")))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let storefront = Storefront::open(ctx.config()).await.unwrap();

    // The refreshed profile wins over the stored one.
    let user = storefront.current_user().await.unwrap();
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_open_drops_expired_token_without_network() {
    let ctx = TestContext::start().await;
    write_session(&ctx, EXPIRED_JWT);
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/auth/me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("u1", "user")))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let storefront = Storefront::open(ctx.config()).await.unwrap();

    assert!(storefront.current_user().await.is_none());
    assert!(!ctx.dir.path().join("session.json").exists());
}

#[tokio::test]
async fn test_open_clears_session_rejected_by_server() {
    let ctx = TestContext::start().await;
    write_session(&ctx, "tok-revoked");
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/auth/me")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&ctx.server)
        .await;

    let storefront = Storefront::open(ctx.config()).await.unwrap();

    assert!(storefront.current_user().await.is_none());
    assert!(!storefront.api().has_token().await);
    assert!(!ctx.dir.path().join("session.json").exists());
}

// =============================================================================
// Expiry mid-session
// =============================================================================

#[tokio::test]
async fn test_unauthorized_response_signs_out() {
    let ctx = TestContext::start().await;
    let storefront = ctx.signed_in("user").await;
    Mock::given(method("GET"))
        .and(path(TestContext::api_path("/orders")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&ctx.server)
        .await;

    let err = storefront.api().list_orders().await.unwrap_err();

    assert!(err.is_auth());
    assert!(storefront.current_user().await.is_none());

    // Later protected calls fail locally.
    let err = storefront.api().list_addresses().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn test_logout_forgets_session_and_cart() {
    let ctx = TestContext::start().await;
    let mut storefront = ctx.signed_in("user").await;

    storefront.logout().await.unwrap();

    assert!(storefront.current_user().await.is_none());
    assert!(storefront.cart().is_empty());
    assert!(!storefront.api().has_token().await);
}
