#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ridedesk_api::models::{
    CommissionInput, DriverStatus, EntityId, OtpPurpose, PromoCodeInput, PromoStatus,
    VehicleInput,
};
use ridedesk_api::{ApiClient, Error, SessionState, SessionStore};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, Arc<SessionStore>) {
    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::with_token(SecretString::from(
        "tok-123".to_string(),
    )));
    let client =
        ApiClient::with_client(reqwest::Client::new(), &server.uri(), session.clone()).unwrap();
    (server, client, session)
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "ok" }))
}

// ── Adapter behaviour ───────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/stats"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "overview": { "totalUsers": 10, "totalDrivers": 4, "totalRevenue": 99.5 },
                "monthlyStats": [{ "_id": { "year": 2025, "month": 3 }, "rides": 7, "revenue": 40.0 }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.overview.total_users, 10);
    assert_eq!(stats.overview.total_drivers, 4);
    assert_eq!(stats.monthly_stats.len(), 1);
    assert_eq!(stats.monthly_stats[0].month.month, 3);
}

#[tokio::test]
async fn test_no_authorization_header_when_signed_out() {
    let server = MockServer::start().await;
    let session = Arc::new(SessionStore::new());
    let client = ApiClient::with_client(reqwest::Client::new(), &server.uri(), session).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(move |req: &wiremock::Request| {
            if req.headers.contains_key("authorization") {
                ResponseTemplate::new(400)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "users": [] } }))
            }
        })
        .mount(&server)
        .await;

    let page = client.list_users(1).await.unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_401_signals_sign_in_required() {
    let (server, client, session) = setup().await;
    let rx = session.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/admin/drivers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .mount(&server)
        .await;

    let result = client.list_drivers(1).await;

    assert!(
        matches!(result, Err(Error::Unauthenticated)),
        "expected Unauthenticated, got: {result:?}"
    );
    assert_eq!(*rx.borrow(), SessionState::SignInRequired);
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn test_non_2xx_carries_server_message() {
    let (server, client, session) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/admin/promo-codes/p9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Promo code not found" })),
        )
        .mount(&server)
        .await;

    let err = client
        .delete_promo_code(&EntityId::from("p9"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "API error (HTTP 404): Promo code not found");
    // Only 401 touches the session.
    assert_eq!(session.state(), SessionState::SignedIn);
}

#[tokio::test]
async fn test_plain_text_error_body() {
    let (server, client, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/admin/approved-driver/d1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream timeout"))
        .mount(&server)
        .await;

    let err = client
        .approve_driver(&EntityId::from("d1"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, Error::Api { status: 500, message } if message == "upstream timeout"),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let (server, client, _) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/notification/n1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let ack = client
        .delete_notification(&EntityId::from("n1"))
        .await
        .unwrap();
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_undecodable_multibyte_body_is_an_error() {
    let (server, client, _) = setup().await;

    let body = format!("{}éééé", "a".repeat(199));
    Mock::given(method("GET"))
        .and(path("/api/admin/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let err = client.dashboard_stats().await.unwrap_err();
    match err {
        Error::Deserialization { message, body: raw } => {
            assert_eq!(raw, body);
            assert!(message.contains("body preview"), "{message}");
        }
        other => panic!("expected a deserialization error, got {other:?}"),
    }
}

// ── List normalization ──────────────────────────────────────────────

#[tokio::test]
async fn test_list_drivers_flat_shape() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/drivers"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "page": 2,
            "totalPages": 3,
            "totalDrivers": 25,
            "data": [
                { "_id": "d1", "status": "approved", "userId": { "_id": "u1", "fullName": "Ana" }, "vehicleId": null },
                { "_id": "d2", "status": "pending", "userId": null, "vehicleId": "v7" }
            ]
        })))
        .mount(&server)
        .await;

    let page = client.list_drivers(2).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!((page.page, page.total_pages, page.total), (2, 3, 25));
    assert_eq!(page.items[0].display_name(), "Ana");
    assert_eq!(page.items[1].status, DriverStatus::Pending);
    assert_eq!(page.items[1].vehicle_id, Some(EntityId::from("v7")));
}

#[tokio::test]
async fn test_list_rides_nested_pagination() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/driver/trip-history"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "rides": [{
                    "_id": "r1",
                    "customerId": { "_id": "c1", "fullName": "Lee" },
                    "driverId": "d1",
                    "totalFare": 18.25,
                    "status": "completed",
                    "createdAt": "2025-03-04T10:00:00.000Z"
                }],
                "pagination": { "current": 1, "pages": 6, "total": 58 }
            }
        })))
        .mount(&server)
        .await;

    let page = client.list_rides(1).await.unwrap();

    assert_eq!((page.page, page.total_pages, page.total), (1, 6, 58));
    assert_eq!(page.items[0].customer_name(), "Lee");
    assert_eq!(page.items[0].total_fare, Some(18.25));
}

#[tokio::test]
async fn test_list_vehicles_items_shape() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/vehicle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [{ "_id": "v1", "taxiName": "Cab 1", "model": "Prius", "plateNumber": "AB-1" }]
            }
        })))
        .mount(&server)
        .await;

    let page = client.list_vehicles(1).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].plate_number, "AB-1");
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_commission_history_keeps_total() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/admin/commission/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "rides": [{ "_id": "r1", "commission": { "rate": 10, "amount": 2.5 } }],
                "totalCommission": 120.75,
                "pagination": { "current": 1, "pages": 1, "total": 1 }
            }
        })))
        .mount(&server)
        .await;

    let history = client.commission_history(1).await.unwrap();
    assert!((history.total_commission - 120.75).abs() < f64::EPSILON);
    assert_eq!(
        history.rides.items[0].commission.and_then(|c| c.amount),
        Some(2.5)
    );
}

#[tokio::test]
async fn test_notifications_top_level_list() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notifications": [
                { "_id": "n1", "message": "New driver signed up", "type": "driver", "isRead": false },
                { "_id": "n2", "message": "Payout done", "type": "payment", "isRead": true }
            ]
        })))
        .mount(&server)
        .await;

    let page = client.list_notifications(1).await.unwrap();
    assert_eq!(ridedesk_api::models::unread_count(&page.items), 1);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_vehicle_posts_under_service() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/services/s1/vehicle"))
        .and(body_json(json!({
            "taxiName": "Cab 9",
            "model": "Corolla",
            "plateNumber": "ZX-9",
            "color": "white",
            "year": 2022,
            "vin": "VIN9"
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let input = VehicleInput {
        taxi_name: "Cab 9".into(),
        model: "Corolla".into(),
        plate_number: "ZX-9".into(),
        color: "white".into(),
        year: 2022,
        vin: "VIN9".into(),
    };
    client
        .create_vehicle(&EntityId::from("s1"), &input)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_assign_vehicle_body() {
    let (server, client, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/admin/services/vehicle/assign-vehicle"))
        .and(body_json(json!({ "vehicleId": "v1", "driverId": "d1" })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .assign_vehicle(&EntityId::from("v1"), &EntityId::from("d1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_promo_code_and_commission_payloads() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/promo-codes"))
        .and(body_json(json!({
            "discountValue": 20.0,
            "startDate": "2025-05-01",
            "expiryDate": "2025-05-31",
            "status": "active"
        })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/admin/commission"))
        .and(body_json(json!({ "date": "2025-05-01", "commission": "12" })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    let day = |d| NaiveDate::from_ymd_opt(2025, 5, d).unwrap();
    client
        .create_promo_code(&PromoCodeInput {
            discount_value: 20.0,
            start_date: day(1),
            expiry_date: day(31),
            status: PromoStatus::Active,
        })
        .await
        .unwrap();
    client
        .create_commission(&CommissionInput {
            date: day(1),
            commission: "12".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_driver_request_actions() {
    let (server, client, _) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/admin/driver-requests/q1/approve"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/driver-requests/q2/reject"))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .approve_driver_request(&EntityId::from("q1"))
        .await
        .unwrap();
    client
        .reject_driver_request(&EntityId::from("q2"))
        .await
        .unwrap();
}

// ── Account ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "emailOrPhone": "admin@example.com", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "user": { "id": "a1", "email": "admin@example.com", "fullName": "Root", "role": "admin" },
                "token": "new-token",
                "refreshToken": "refresh"
            }
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("s3cret".to_string());
    let session = client.login("admin@example.com", &secret).await.unwrap();
    assert!(session.user.is_admin());
    assert_eq!(session.user.full_name.as_deref(), Some("Root"));
}

#[tokio::test]
async fn test_login_failure_does_not_sign_out() {
    let (server, client, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.login("admin@example.com", &secret).await;

    assert!(
        matches!(&result, Err(Error::Authentication { message }) if message == "Invalid credentials"),
        "expected Authentication error, got: {result:?}"
    );
    assert_eq!(session.state(), SessionState::SignedIn);
}

#[tokio::test]
async fn test_login_success_false_with_200() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Account locked"
        })))
        .mount(&server)
        .await;

    let secret = SecretString::from("pw".to_string());
    let result = client.login("admin", &secret).await;
    assert!(matches!(&result, Err(Error::Authentication { message }) if message == "Account locked"));
}

#[tokio::test]
async fn test_verify_otp_sends_type() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/verify-otp"))
        .and(body_json(json!({ "email": "a@b.c", "otp": "123456", "type": "password_reset" })))
        .respond_with(ok())
        .expect(1)
        .mount(&server)
        .await;

    client
        .verify_otp("a@b.c", "123456", OtpPurpose::PasswordReset)
        .await
        .unwrap();
}
