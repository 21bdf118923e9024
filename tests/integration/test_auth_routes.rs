//! Registration, login, token and account lifecycle tests.

mod common;

use axum::http::StatusCode;
use common::{ADMIN_EMAIL, PASSWORD, create_test_app};
use rental_marketplace_api::models::ApprovalStatus;
use rental_marketplace_api::storage::StorageBackend;
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_and_openapi_are_public() {
    let app = create_test_app();

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");

    let response = app.server.get("/openapi.json").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]["/auth/register"].is_object());
}

#[tokio::test]
async fn test_register_creates_pending_account_without_tokens() {
    let app = create_test_app();

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({
            "username": "  alice  ",
            "email": "Alice@Example.COM",
            "password": PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending_approval");
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "tenant");
    assert_eq!(body["user"]["is_approved"], false);
    assert!(body.get("tokens").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = create_test_app();
    let cases = [
        (
            json!({"email": "a@b.co", "password": PASSWORD}),
            StatusCode::BAD_REQUEST,
            "Missing required field: username",
        ),
        (
            json!({"username": "ab", "email": "a@b.co", "password": PASSWORD}),
            StatusCode::BAD_REQUEST,
            "Username must be at least 3 characters long",
        ),
        (
            json!({"username": "abc", "email": "not-an-email", "password": PASSWORD}),
            StatusCode::BAD_REQUEST,
            "Invalid email format",
        ),
        (
            json!({"username": "abc", "email": "a@b.co", "password": "12345"}),
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters long",
        ),
        (
            json!({"username": "abc", "email": "a@b.co", "password": PASSWORD, "role": "owner"}),
            StatusCode::BAD_REQUEST,
            "Invalid role. Must be one of: tenant, landlord",
        ),
        (
            json!({"username": "abc", "email": "a@b.co", "password": PASSWORD, "role": "admin"}),
            StatusCode::FORBIDDEN,
            "Invalid role for public registration",
        ),
    ];

    for (body, status, message) in cases {
        let response = app.server.post("/auth/register").json(&body).await;
        assert_eq!(response.status_code(), status, "body: {}", body);
        let error: Value = response.json();
        assert_eq!(error["error"], message);
        assert_eq!(error["status"], status.as_u16());
    }
}

#[tokio::test]
async fn test_register_duplicates_conflict() {
    let app = create_test_app();
    app.register("bob", "tenant").await;

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({"username": "bob", "email": "other@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "Username already exists");

    let response = app
        .server
        .post("/auth/register")
        .json(&json!({"username": "bobby", "email": "BOB@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["error"], "Email already exists");
}

#[tokio::test]
async fn test_malformed_json_is_a_json_400() {
    let app = create_test_app();
    let response = app
        .server
        .post("/auth/register")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_pending_and_rejected_accounts_cannot_login() {
    let app = create_test_app();
    let registered = app.register("carol", "landlord").await;
    let id = registered["user"]["id"].as_i64().unwrap();

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "carol@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["status"], "pending_approval");
    assert_eq!(body["user"]["id"], id);

    app.state
        .storage
        .set_approval_status(id, ApprovalStatus::Rejected)
        .await
        .unwrap();
    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "carol@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert!(response.json::<Value>().get("user").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = create_test_app();
    app.approved("dave", "tenant").await;

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "dave@example.com", "password": "wrong-password"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid credentials");

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "nobody@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "dave@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Email and password are required"
    );
}

#[tokio::test]
async fn test_approved_login_issues_working_tokens() {
    let app = create_test_app();
    let body = app.register("erin", "tenant").await;
    let id = body["user"]["id"].as_i64().unwrap();
    app.state
        .storage
        .set_approval_status(id, ApprovalStatus::Approved)
        .await
        .unwrap();

    let body = app.login("ERIN@example.com", PASSWORD).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["tokens"]["token_type"], "Bearer");
    let access = body["tokens"]["access_token"].as_str().unwrap();

    let response = app.server.get("/auth/me").authorization_bearer(access).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["user"]["username"], "erin");

    let response = app
        .server
        .post("/auth/validate")
        .authorization_bearer(access)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["user_id"], id);
    assert_eq!(body["user"]["role"], "tenant");
}

#[tokio::test]
async fn test_missing_or_garbage_token_is_401() {
    let app = create_test_app();

    let response = app.server.get("/auth/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["status"], 401);

    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer("not.a.jwt")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let app = create_test_app();
    let account = app.approved("frank", "tenant").await;

    let response = app
        .server
        .post("/auth/logout")
        .authorization_bearer(&account.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&account.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Token has been revoked");
}

#[tokio::test]
async fn test_refresh_flow_and_token_types() {
    let app = create_test_app();
    app.approved("gina", "landlord").await;
    let body = app.login("gina@example.com", PASSWORD).await;
    let access = body["tokens"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["tokens"]["refresh_token"].as_str().unwrap().to_string();

    // Refresh token as Bearer
    let response = app
        .server
        .post("/auth/refresh")
        .authorization_bearer(&refresh)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let new_access = response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&new_access)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Refresh token in the body
    let response = app
        .server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Wrong token types
    let response = app
        .server
        .post("/auth/refresh")
        .authorization_bearer(&access)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&refresh)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app.server.post("/auth/refresh").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token_of_the_session() {
    let app = create_test_app();
    app.approved("ivy", "tenant").await;
    let first = app.login("ivy@example.com", PASSWORD).await;
    let second = app.login("ivy@example.com", PASSWORD).await;
    let token = |body: &Value, kind: &str| body["tokens"][kind].as_str().unwrap().to_string();

    let response = app
        .server
        .post("/auth/logout")
        .authorization_bearer(&token(&first, "access_token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": token(&first, "refresh_token") }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Token has been revoked");

    // Another login of the same account is unaffected
    let response = app
        .server
        .post("/auth/refresh")
        .authorization_bearer(&token(&second, "refresh_token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let refreshed = response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&refreshed)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Access tokens refreshed inside a session die with it
    let response = app
        .server
        .post("/auth/logout")
        .authorization_bearer(&token(&second, "access_token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let response = app
        .server
        .get("/auth/me")
        .authorization_bearer(&refreshed)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_account_cannot_refresh() {
    let app = create_test_app();
    app.admin().await;
    let first = app.login(ADMIN_EMAIL, PASSWORD).await;
    let second = app.login(ADMIN_EMAIL, PASSWORD).await;

    let response = app
        .server
        .delete("/auth/delete-account")
        .authorization_bearer(first["tokens"]["access_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .post("/auth/refresh")
        .authorization_bearer(first["tokens"]["refresh_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/auth/refresh")
        .authorization_bearer(second["tokens"]["refresh_token"].as_str().unwrap())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "User no longer exists");
}

#[tokio::test]
async fn test_delete_account_cascades_to_properties() {
    let app = create_test_app();
    let landlord = app.approved("hank", "landlord").await;
    let property_id = app.simple_property(&landlord).await;

    let response = app
        .server
        .delete("/auth/delete-account")
        .authorization_bearer(&landlord.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["properties_deleted"], 1);

    let response = app
        .server
        .get(&format!("/api/properties/{}", property_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = app
        .server
        .post("/auth/login")
        .json(&json!({"email": "hank@example.com", "password": PASSWORD}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_bootstrap_is_idempotent() {
    let app = create_test_app();
    let admin = app.admin().await;
    let again = app.admin().await;
    assert_eq!(admin.id, again.id);

    let users = app.state.storage.list_users().await.unwrap();
    assert_eq!(
        users.iter().filter(|u| u.email == ADMIN_EMAIL).count(),
        1
    );
}
