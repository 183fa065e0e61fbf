use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use shared::{error::ErrorCode, protocol::PasswordSignInRequest};

use crate::tests::{credentials, spawn_server};
use crate::{AuthError, AuthProvider, MissingAuthProvider, PasswordAuthClient};

const USER_ID: &str = "6f1c7a52-0f6b-4b8e-9a53-4cf0f0a4b2d1";

async fn handle_token(
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<PasswordSignInRequest>,
) -> (StatusCode, Json<Value>) {
    if query.get("grant_type").map(String::as_str) != Some("password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        );
    }
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "No API key found in request" })),
        );
    }
    if body.email == "reader@example.com" && body.password == "correct horse" {
        return (
            StatusCode::OK,
            Json(json!({
                "access_token": "user-jwt",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh-1",
                "user": { "id": USER_ID, "email": body.email }
            })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })),
    )
}

async fn auth_client(anon_key: &str) -> PasswordAuthClient {
    let app = Router::new().route("/auth/v1/token", post(handle_token));
    let base_url = spawn_server(app).await.expect("spawn auth server");
    PasswordAuthClient::new(credentials(&base_url, anon_key))
}

#[tokio::test]
async fn password_sign_in_returns_session() {
    let client = auth_client("anon-key").await;

    let session = client
        .sign_in_with_password(" reader@example.com ", "correct horse")
        .await
        .expect("sign in");

    assert_eq!(session.access_token, "user-jwt");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.user_id.to_string(), USER_ID);
    assert_eq!(session.email.as_deref(), Some("reader@example.com"));
    assert!(session.expires_at.is_some());
}

#[tokio::test]
async fn provider_message_is_surfaced_verbatim() {
    let client = auth_client("anon-key").await;

    let err = client
        .sign_in_with_password("reader@example.com", "wrong")
        .await
        .expect_err("must fail");

    assert!(matches!(err, AuthError::Rejected(_)));
    assert_eq!(err.to_string(), "Invalid login credentials");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn missing_api_key_message_comes_from_message_field() {
    let client = auth_client("wrong-key").await;

    let err = client
        .sign_in_with_password("reader@example.com", "correct horse")
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "No API key found in request");
}

#[tokio::test]
async fn empty_credentials_rejected_locally() {
    let client = PasswordAuthClient::new(credentials("http://127.0.0.1:9", "anon-key"));

    let err = client
        .sign_in_with_password("   ", "secret")
        .await
        .expect_err("must fail");
    assert!(matches!(err, AuthError::Validation(_)));

    let err = client
        .sign_in_with_password("reader@example.com", "")
        .await
        .expect_err("must fail");
    assert!(matches!(err, AuthError::Validation(_)));
}

#[tokio::test]
async fn missing_provider_is_unavailable() {
    let err = MissingAuthProvider
        .sign_in_with_password("reader@example.com", "secret")
        .await
        .expect_err("must fail");
    assert!(matches!(err, AuthError::Unavailable));
}
