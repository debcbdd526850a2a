mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{mint_token, new_principal, test_config, TestApp};
use funnel_builder_api::auth::Principal;

#[tokio::test]
async fn sync_is_idempotent_and_refreshes_email() {
    let app = TestApp::new();
    let mut who = new_principal();

    let first = app.post_json("/api/sync-user", Some(&mint_token(&who)), json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["message"], "User synced successfully");
    assert_eq!(first.body["data"]["user"]["id"], who.id.to_string());

    who.email = Some("renamed@example.com".to_string());
    let second = app.post_json("/api/sync-user", Some(&mint_token(&who)), json!({})).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["user"]["email"], "renamed@example.com");

    let users = app.store.users().await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email.as_deref(), Some("renamed@example.com"));
}

#[tokio::test]
async fn sync_without_email_stores_null() {
    let app = TestApp::new();
    let who = Principal {
        email: None,
        ..new_principal()
    };

    let res = app.post_json("/api/sync-user", Some(&mint_token(&who)), json!({})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"]["user"]["email"].is_null());
}

#[tokio::test]
async fn store_failure_is_500() {
    let app = TestApp::new();
    app.store.fail_user_upserts(true);

    let res = app.post_json("/api/sync-user", Some(&mint_token(&new_principal())), json!({})).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn no_rate_headers_when_limiting_disabled() {
    let app = TestApp::new();
    let res = app.post_json("/api/sync-user", Some(&mint_token(&new_principal())), json!({})).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header("x-ratelimit-limit").is_none());
}

#[tokio::test]
async fn limit_applies_before_authentication() {
    let mut config = test_config();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 2;
    config.api.rate_limit_window_secs = 60;
    let app = TestApp::with_config(config);
    let token = mint_token(&new_principal());

    let first = app.post_json("/api/sync-user", Some(&token), json!({})).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header("x-ratelimit-limit"), Some("2"));
    assert_eq!(first.header("x-ratelimit-remaining"), Some("1"));

    // Unauthenticated calls still spend the shared budget
    let anonymous = app.post_json("/api/sync-user", None, json!({})).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.header("x-ratelimit-remaining"), Some("0"));

    let limited = app.post_json("/api/sync-user", Some(&token), json!({})).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.body["code"], "TOO_MANY_REQUESTS");
    assert!(limited.header("retry-after").is_some());
    assert_eq!(limited.header("x-ratelimit-remaining"), Some("0"));

    // Only the first call wrote
    assert_eq!(app.store.users().await.len(), 1);
}

#[tokio::test]
async fn limit_does_not_touch_other_routes() {
    let mut config = test_config();
    config.api.enable_rate_limiting = true;
    config.api.rate_limit_requests = 1;
    let app = TestApp::with_config(config);
    let token = mint_token(&new_principal());

    app.post_json("/api/sync-user", Some(&token), json!({})).await;
    let res = app.get("/api/funnels", Some(&token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header("x-ratelimit-limit").is_none());
}
