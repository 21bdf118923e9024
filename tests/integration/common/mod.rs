//! Shared helpers for the route tests: an in-memory app and approved accounts.
#![allow(dead_code)]

use axum::http::StatusCode;
use axum_test::TestServer;
use rental_marketplace_api::config::{AdminBootstrap, AppConfig};
use rental_marketplace_api::models::ApprovalStatus;
use rental_marketplace_api::routes::{AppState, create_app};
use rental_marketplace_api::storage::StorageBackend;
use serde_json::{Value, json};

pub const PASSWORD: &str = "secret123";
pub const ADMIN_EMAIL: &str = "admin@example.com";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// A logged-in account.
pub struct Account {
    pub id: i64,
    pub token: String,
}

pub fn create_test_app() -> TestApp {
    let state = AppState::new(AppConfig::for_tests());
    let server = TestServer::new(create_app(state.clone())).unwrap();
    TestApp { server, state }
}

impl TestApp {
    pub async fn register(&self, username: &str, role: &str) -> Value {
        let response = self
            .server
            .post("/auth/register")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": PASSWORD,
                "role": role,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json()
    }

    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json()
    }

    /// Register, approve directly in the store, then log in.
    pub async fn approved(&self, username: &str, role: &str) -> Account {
        let body = self.register(username, role).await;
        let id = body["user"]["id"].as_i64().unwrap();
        self.state
            .storage
            .set_approval_status(id, ApprovalStatus::Approved)
            .await
            .unwrap();
        let body = self
            .login(&format!("{}@example.com", username), PASSWORD)
            .await;
        Account {
            id,
            token: body["tokens"]["access_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn admin(&self) -> Account {
        self.state
            .auth_service()
            .bootstrap_admin(&AdminBootstrap {
                username: "admin".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        let body = self.login(ADMIN_EMAIL, PASSWORD).await;
        Account {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["tokens"]["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create a listing as `landlord` and return its id.
    pub async fn property(&self, landlord: &Account, body: Value) -> i64 {
        let response = self
            .server
            .post("/api/properties")
            .authorization_bearer(&landlord.token)
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["property"]["id"].as_i64().unwrap()
    }

    pub async fn simple_property(&self, landlord: &Account) -> i64 {
        self.property(
            landlord,
            json!({
                "name": "Garden Flat",
                "location": "Leeds",
                "price": 950.0,
                "property_type": "apartment",
                "bedrooms": 2,
            }),
        )
        .await
    }
}
