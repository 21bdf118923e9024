//! Leases, rent payments and the add-on service catalog.

mod common;

use axum::http::StatusCode;
use common::{Account, TestApp, create_test_app};
use rental_marketplace_api::models::PaymentStatus;
use rental_marketplace_api::storage::StorageBackend;
use serde_json::{Value, json};

fn lease_body(property_id: i64, tenant_id: i64) -> Value {
    json!({
        "property_id": property_id,
        "tenant_id": tenant_id,
        "monthly_rent": 950.0,
        "security_deposit": 1900.0,
        "start_date": "2024-01-01",
        "end_date": "2024-12-31",
        "parking_included": true,
    })
}

async fn pay(app: &TestApp, tenant: &Account, property_id: i64, amount: f64) -> i64 {
    let response = app
        .server
        .post("/api/payments")
        .authorization_bearer(&tenant.token)
        .json(&json!({"property_id": property_id, "amount": amount}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["payment"]["id"].as_i64().unwrap()
}

async fn create_service(app: &TestApp, admin: &Account, name: &str, active: bool) -> i64 {
    let response = app
        .server
        .post("/api/services")
        .authorization_bearer(&admin.token)
        .json(&json!({"name": name, "rate": 40.0, "is_active": active}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()["service"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_lease_creation() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let rival = app.approved("rick", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let property_id = app.simple_property(&landlord).await;

    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&landlord.token)
        .json(&lease_body(property_id, tenant.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let lease = &response.json::<Value>()["lease"];
    assert_eq!(lease["status"], "pending");
    assert_eq!(lease["landlord_id"], landlord.id);
    assert_eq!(lease["lease_duration_months"], 11);
    assert_eq!(lease["parking_included"], true);
    assert_eq!(lease["utilities_included"], false);
    assert!(lease["signed_at"].is_null());

    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&rival.token)
        .json(&lease_body(property_id, tenant.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.json::<Value>()["error"],
        "You can only create leases for your own properties"
    );

    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&tenant.token)
        .json(&lease_body(property_id, tenant.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let mut backwards = lease_body(property_id, tenant.id);
    backwards["end_date"] = json!("2023-06-01");
    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&landlord.token)
        .json(&backwards)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "End date must be after start date"
    );

    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&landlord.token)
        .json(&lease_body(property_id, rival.id))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Lease holder must be a tenant");

    let response = app
        .server
        .post("/api/leases")
        .authorization_bearer(&landlord.token)
        .json(&json!({"property_id": property_id}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Missing required field: tenant_id"
    );
}

#[tokio::test]
async fn test_lease_lifecycle_and_visibility() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let stranger = app.approved("sam", "tenant").await;
    let property_id = app.simple_property(&landlord).await;

    let lease: Value = app
        .server
        .post("/api/leases")
        .authorization_bearer(&landlord.token)
        .json(&lease_body(property_id, tenant.id))
        .await
        .json();
    let lease_id = lease["lease"]["id"].as_i64().unwrap();

    let response = app
        .server
        .get(&format!("/api/leases/{}", lease_id))
        .authorization_bearer(&tenant.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .get(&format!("/api/leases/{}", lease_id))
        .authorization_bearer(&stranger.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let status_path = format!("/api/leases/{}/status", lease_id);
    let response = app
        .server
        .put(&status_path)
        .authorization_bearer(&landlord.token)
        .json(&json!({"status": "expired"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&status_path)
        .authorization_bearer(&landlord.token)
        .json(&json!({"status": "active"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["lease"]["status"], "active");
    assert!(body["lease"]["signed_at"].is_string());

    let response = app
        .server
        .put(&status_path)
        .authorization_bearer(&tenant.token)
        .json(&json!({"status": "terminated"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    for (account, expected) in [(&tenant, 1), (&stranger, 0), (&landlord, 1)] {
        let body: Value = app
            .server
            .get("/api/leases")
            .authorization_bearer(&account.token)
            .await
            .json();
        assert_eq!(body["total"], expected);
    }
}

#[tokio::test]
async fn test_payment_recording() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let property_id = app.simple_property(&landlord).await;

    let response = app
        .server
        .post("/api/payments")
        .authorization_bearer(&tenant.token)
        .json(&json!({"property_id": property_id, "amount": 950.0, "due_date": "2024-02-01"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let payment = &response.json::<Value>()["payment"];
    assert_eq!(payment["status"], "pending");
    assert_eq!(payment["method"], "bank_transfer");
    assert_eq!(payment["tenant_id"], tenant.id);
    assert_eq!(payment["due_date"], "2024-02-01");

    let cases = [
        (json!({"property_id": property_id, "amount": 0.0}), StatusCode::BAD_REQUEST),
        (
            json!({"property_id": property_id, "amount": 10.0, "method": "barter"}),
            StatusCode::BAD_REQUEST,
        ),
        (json!({"amount": 10.0}), StatusCode::BAD_REQUEST),
        (json!({"property_id": 999, "amount": 10.0}), StatusCode::NOT_FOUND),
        (
            json!({"property_id": property_id, "amount": 10.0, "lease_id": 999}),
            StatusCode::NOT_FOUND,
        ),
    ];
    for (body, expected) in cases {
        let response = app
            .server
            .post("/api/payments")
            .authorization_bearer(&tenant.token)
            .json(&body)
            .await;
        assert_eq!(response.status_code(), expected, "{}", body);
    }

    let response = app
        .server
        .post("/api/payments")
        .authorization_bearer(&landlord.token)
        .json(&json!({"property_id": property_id, "amount": 10.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_payment_completion() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let rival = app.approved("rick", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let property_id = app.simple_property(&landlord).await;
    let payment_id = pay(&app, &tenant, property_id, 950.0).await;
    let path = format!("/api/payments/{}/complete", payment_id);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&rival.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&tenant.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&landlord.token)
        .json(&json!({"transaction_id": "TX-1"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let payment = &response.json::<Value>()["payment"];
    assert_eq!(payment["status"], "completed");
    assert_eq!(payment["transaction_id"], "TX-1");
    assert!(payment["paid_date"].is_string());

    // Completing without a body is accepted, but not twice
    let response = app
        .server
        .put(&path)
        .authorization_bearer(&landlord.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Payment is already completed"
    );

    let response = app
        .server
        .put("/api/payments/999/complete")
        .authorization_bearer(&landlord.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_pending_payments_can_be_completed() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let property_id = app.simple_property(&landlord).await;
    let payment_id = pay(&app, &tenant, property_id, 950.0).await;

    let mut payment = app
        .state
        .storage
        .get_payment(payment_id)
        .await
        .unwrap()
        .unwrap();
    payment.status = PaymentStatus::Failed;
    app.state
        .storage
        .update_payment(payment, PaymentStatus::Pending)
        .await
        .unwrap();

    let response = app
        .server
        .put(&format!("/api/payments/{}/complete", payment_id))
        .authorization_bearer(&landlord.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Cannot complete a failed payment"
    );
}

#[tokio::test]
async fn test_payment_lists_are_scoped() {
    let app = create_test_app();
    let landlord = app.approved("lena", "landlord").await;
    let rival = app.approved("rick", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let admin = app.admin().await;
    let property_id = app.simple_property(&landlord).await;

    for i in 0..12 {
        pay(&app, &tenant, property_id, 100.0 + i as f64).await;
    }

    let body: Value = app
        .server
        .get("/api/payments/recent")
        .authorization_bearer(&tenant.token)
        .await
        .json();
    assert_eq!(body["total"], 10);
    assert_eq!(body["payments"][0]["amount"], 111.0);

    for (account, expected) in [(&tenant, 12), (&landlord, 12), (&rival, 0), (&admin, 12)] {
        let body: Value = app
            .server
            .get("/api/payments")
            .authorization_bearer(&account.token)
            .await
            .json();
        assert_eq!(body["total"], expected);
    }
}

#[tokio::test]
async fn test_service_catalog_management() {
    let app = create_test_app();
    let admin = app.admin().await;
    let landlord = app.approved("lena", "landlord").await;

    let cleaning = create_service(&app, &admin, "Cleaning", true).await;
    create_service(&app, &admin, "Aerial repair", false).await;

    let body: Value = app.server.get("/api/services").await.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["services"][0]["name"], "Cleaning");

    let body: Value = app
        .server
        .get("/api/services")
        .authorization_bearer(&admin.token)
        .await
        .json();
    assert_eq!(body["total"], 2);
    assert_eq!(body["services"][0]["name"], "Aerial repair");

    let response = app
        .server
        .post("/api/services")
        .authorization_bearer(&landlord.token)
        .json(&json!({"name": "Gardening", "rate": 25.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/services")
        .authorization_bearer(&admin.token)
        .json(&json!({"name": "Gardening", "rate": -1.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&format!("/api/services/{}", cleaning))
        .authorization_bearer(&admin.token)
        .json(&json!({"rate": 55.0}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["service"]["rate"], 55.0);

    let response = app
        .server
        .delete(&format!("/api/services/{}", cleaning))
        .authorization_bearer(&admin.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .delete(&format!("/api/services/{}", cleaning))
        .authorization_bearer(&admin.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_requests() {
    let app = create_test_app();
    let admin = app.admin().await;
    let landlord = app.approved("lena", "landlord").await;
    let rival = app.approved("rick", "landlord").await;
    let tenant = app.approved("tom", "tenant").await;
    let property_id = app.simple_property(&landlord).await;
    let cleaning = create_service(&app, &admin, "Cleaning", true).await;
    let retired = create_service(&app, &admin, "Chimney sweep", false).await;

    let request = |service_id: i64| {
        json!({
            "service_id": service_id,
            "property_id": property_id,
            "requested_date": "2024-03-15",
            "notes": "Mornings please",
        })
    };

    let response = app
        .server
        .post("/api/service-bookings")
        .authorization_bearer(&tenant.token)
        .json(&request(retired))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Service is not currently offered"
    );

    let response = app
        .server
        .post("/api/service-bookings")
        .authorization_bearer(&landlord.token)
        .json(&request(cleaning))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .post("/api/service-bookings")
        .authorization_bearer(&tenant.token)
        .json(&request(cleaning))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let booking = &response.json::<Value>()["service_booking"];
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["requested_date"], "2024-03-15");
    let id = booking["id"].as_i64().unwrap();
    let path = format!("/api/service-bookings/{}", id);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&rival.token)
        .json(&json!({"status": "approved"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .put(&path)
        .authorization_bearer(&landlord.token)
        .json(&json!({"status": "completed"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    for status in ["approved", "completed"] {
        let response = app
            .server
            .put(&path)
            .authorization_bearer(&landlord.token)
            .json(&json!({"status": status}))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK, "{}", status);
        assert_eq!(response.json::<Value>()["service_booking"]["status"], status);
    }

    for (account, expected) in [(&tenant, 1), (&landlord, 1), (&rival, 0), (&admin, 1)] {
        let body: Value = app
            .server
            .get("/api/service-bookings")
            .authorization_bearer(&account.token)
            .await
            .json();
        assert_eq!(body["total"], expected);
    }
}
