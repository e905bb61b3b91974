mod common;

use common::{ROOT, TestApp, code};
use http::StatusCode;
use serde_json::json;
use shared::error::ErrorCode;

#[tokio::test]
async fn root_domain_serves_landing() {
    let app = TestApp::new();
    let (status, body) = app.get(ROOT, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("Bring The Menu"));

    let (status, body) = app.get("www.bringthemenu.com", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "full");
}

#[tokio::test]
async fn subdomain_root_is_storefront() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("owner@acme.test", "Acme Diner").await;
    app.add_item(&token, "Margherita", "Pizza", 10.99).await;

    let (status, page) = app.get("acme-diner.bringthemenu.com", "/", None).await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["restaurant"]["slug"], "acme-diner");
    assert!(page.get("table").is_none());

    // Port and case do not matter
    let (status, menu) = app.get("Acme-Diner.bringthemenu.com:443", "/menu", None).await;
    assert_eq!(status, StatusCode::OK, "{menu}");
    assert_eq!(menu[0]["items"][0]["name"], "Margherita");
}

#[tokio::test]
async fn reserved_name_gets_reachable_subdomain() {
    let app = TestApp::new();
    let (_, restaurant) = app.sign_up("owner@www.test", "WWW").await;
    assert_eq!(restaurant["slug"], "www-2");

    let (status, page) = app.get("www-2.bringthemenu.com", "/", None).await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["restaurant"]["name"], "WWW");
}

#[tokio::test]
async fn api_is_not_rewritten_on_subdomains() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("owner@acme.test", "Acme Diner").await;

    let (status, body) = app
        .get("acme-diner.bringthemenu.com", "/api/restaurant", Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Acme Diner");
}

#[tokio::test]
async fn unknown_subdomain_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.get("nobody.bringthemenu.com", "/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(code(&body), ErrorCode::TenantNotFound as u64);
}

#[tokio::test]
async fn landing_only_mode_answers_unavailable() {
    let app = TestApp::landing_only();

    let (status, body) = app.get(ROOT, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "landing");
    let (status, _) = app.get(ROOT, "/", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            ROOT,
            "/api/auth/sign-in",
            None,
            json!({ "email": "owner@acme.test", "password": "Secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(code(&body), ErrorCode::ServiceUnavailable as u64);

    let (status, _) = app.get("acme-diner.bringthemenu.com", "/menu", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn owner_routes_need_a_token() {
    let app = TestApp::new();
    let (status, body) = app.get(ROOT, "/api/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), ErrorCode::NotAuthenticated as u64);

    let (status, body) = app.get(ROOT, "/api/orders", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), ErrorCode::TokenInvalid as u64);
}

#[tokio::test]
async fn sign_out_revokes_token() {
    let app = TestApp::new();
    let (token, _) = app.sign_up("owner@acme.test", "Acme Diner").await;
    let (status, _) = app.get(ROOT, "/api/restaurant", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(ROOT, "/api/auth/sign-out", Some(&token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(ROOT, "/api/restaurant", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), ErrorCode::TokenInvalid as u64);
}

#[tokio::test]
async fn sign_in_returns_existing_restaurant() {
    let app = TestApp::new();
    let (_, restaurant) = app.sign_up("owner@acme.test", "Acme Diner").await;

    let (status, body) = app
        .post(
            ROOT,
            "/api/auth/sign-in",
            None,
            json!({ "email": "owner@acme.test", "password": "Secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["restaurant"]["id"], restaurant["id"]);
    assert_eq!(body["is_new_restaurant"], false);

    let (status, body) = app
        .post(
            ROOT,
            "/api/auth/sign-in",
            None,
            json!({ "email": "owner@acme.test", "password": "Wrong123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), ErrorCode::InvalidCredentials as u64);
}

#[tokio::test]
async fn duplicate_sign_up_rejected() {
    let app = TestApp::new();
    app.sign_up("owner@acme.test", "Acme Diner").await;

    let (status, body) = app
        .post(
            ROOT,
            "/api/auth/sign-up",
            None,
            json!({
                "email": "owner@acme.test",
                "password": "Secret123",
                "restaurant_name": "Acme Again",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(code(&body), ErrorCode::AccountExists as u64);
}

#[tokio::test]
async fn sign_up_is_rate_limited() {
    let app = TestApp::new();
    for i in 0..3 {
        app.sign_up(&format!("owner{i}@acme.test"), &format!("Diner {i}"))
            .await;
    }
    let (status, body) = app
        .post(
            ROOT,
            "/api/auth/sign-up",
            None,
            json!({
                "email": "owner9@acme.test",
                "password": "Secret123",
                "restaurant_name": "Diner 9",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(code(&body), ErrorCode::RateLimited as u64);
}
