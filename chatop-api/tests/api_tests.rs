mod common;

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

fn decode_claims(token: &str) -> Value {
    let payload = token.split('.').nth(1).expect("Token has no claims segment");
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .expect("Claims are not base64url");
    serde_json::from_slice(&bytes).expect("Claims are not JSON")
}

fn alter_last_char(token: &str) -> String {
    let mut altered = token.to_string();
    let last = altered.pop().expect("Empty token");
    altered.push(if last == 'A' { 'Q' } else { 'A' });
    altered
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::spawn().await;

    let registration_token = app.register("a@test.com", "secret123").await;
    assert_eq!(registration_token.split('.').count(), 3);

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "a@test.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().unwrap();

    let claims = decode_claims(token);
    assert_eq!(claims["sub"], "a@test.com");
    assert_eq!(claims["authorities"], json!(["USER"]));
    assert!(claims["exp"].as_i64().unwrap() > claims["iat"].as_i64().unwrap());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("a@test.com", "secret123").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "a@test.com",
            "name": "Someone Else",
            "password": "other-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({
            "error": "BAD_REQUEST",
            "status": 400,
            "message": "Email already in use"
        })
    );
}

#[tokio::test]
async fn test_register_invalid_body() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({
            "email": "not-an-email",
            "name": "Alice",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/api/auth/register")
        .json(&json!({ "email": "a@test.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;

    app.register("a@test.com", "secret123").await;

    let wrong_password = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "a@test.com",
            "password": "wrong-password"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let unknown_email = app
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@test.com",
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_email: Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({
            "error": "MISSING_TOKEN",
            "status": 401,
            "message": "Authentication required"
        })
    );
}

#[tokio::test]
async fn test_protected_route_with_tampered_token() {
    let app = TestApp::spawn().await;

    let token = app.register("a@test.com", "secret123").await;

    let response = app
        .get_authenticated("/api/auth/me", &alter_last_char(&token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "BAD_SIGNATURE");
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_protected_route_with_malformed_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get_authenticated("/api/auth/me", "only.two")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MALFORMED_TOKEN");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::spawn_with_lifetime(Duration::from_secs(1)).await;

    let token = app.register("a@test.com", "secret123").await;

    tokio::time::sleep(Duration::from_secs(2)).await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_get_authenticated_user() {
    let app = TestApp::spawn().await;

    let token = app.register("a@test.com", "secret123").await;

    let response = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "a@test.com");
    assert_eq!(body["name"], "Test User");
    assert!(body["id"].is_string());
    assert!(body["created_at"].is_string());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_get_user_by_id() {
    let app = TestApp::spawn().await;

    let token = app.register("a@test.com", "secret123").await;

    let me: Value = app
        .get_authenticated("/api/auth/me", &token)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    let user_id = me["id"].as_str().unwrap();

    let response = app
        .get_authenticated(&format!("/api/user/{}", user_id), &token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, me);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let app = TestApp::spawn().await;

    let token = app.register("a@test.com", "secret123").await;

    let response = app
        .get_authenticated(
            &format!("/api/user/{}", uuid::Uuid::new_v4()),
            &token,
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_user_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get(&format!("/api/user/{}", uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
