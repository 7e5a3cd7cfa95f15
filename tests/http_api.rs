//! HTTP routing tests.
//!
//! Drives the real router with `tower::ServiceExt::oneshot`; storage is the
//! in-memory store and the gateway is mocked.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use boxoffice::adapters::http::app_router;
use boxoffice::adapters::http::ticketing::{SIGNATURE_HEADER, USER_ID_HEADER};
use boxoffice::domain::payment::{sign_payload, PaymentError};

use common::{webhook_body, TestApp, WEBHOOK_SECRET};

// =============================================================================
// Helpers
// =============================================================================

fn router(app: &TestApp) -> Router {
    app_router(app.state(), Duration::from_secs(5), &[])
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn registration_body(ticket_type_id: impl serde::Serialize, quantity: u32) -> Value {
    json!({
        "ticketTypeId": ticket_type_id,
        "quantity": quantity,
        "fullName": "Ada Obi",
        "email": "ada@example.com",
        "paymentInstrument": { "method": "card" }
    })
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn free_registration_returns_tickets() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;

    let (status, body) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(general.id, 2),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
    assert!(body.get("payment").is_none());
}

#[tokio::test]
async fn paid_registration_returns_checkout() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;

    let (status, body) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(vip.id, 1),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["payment"]["reference"], "ref_1");
    assert_eq!(
        body["payment"]["authorizationUrl"],
        "https://checkout.mock/ref_1"
    );
}

#[tokio::test]
async fn sold_out_is_conflict() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 1).await;

    let (status, body) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(vip.id, 2),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "OUT_OF_STOCK");
}

#[tokio::test]
async fn missing_instrument_is_bad_request() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    let mut body = registration_body(vip.id, 1);
    body.as_object_mut().unwrap().remove("paymentInstrument");

    let (status, _) = send(
        router(&app),
        post_json(&format!("/events/{}/registrations", app.event.id), body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_event_id_is_bad_request() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;

    let (status, body) = send(
        router(&app),
        post_json(
            "/events/not-a-uuid/registrations",
            registration_body(general.id, 1),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn unknown_ticket_type_is_not_found() {
    let app = TestApp::new().await;

    let (status, _) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(uuid::Uuid::new_v4(), 1),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_principal_header_is_unauthorized() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;
    let mut request = post_json(
        &format!("/events/{}/registrations", app.event.id),
        registration_body(general.id, 1),
    );
    request
        .headers_mut()
        .insert(USER_ID_HEADER, "".parse().unwrap());

    let (status, _) = send(router(&app), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.registrations().await.is_empty());
}

#[tokio::test]
async fn principal_is_recorded_on_the_registration() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;
    let mut request = post_json(
        &format!("/events/{}/registrations", app.event.id),
        registration_body(general.id, 1),
    );
    request
        .headers_mut()
        .insert(USER_ID_HEADER, "user-42".parse().unwrap());

    let (status, _) = send(router(&app), request).await;

    assert_eq!(status, StatusCode::OK);
    let registration = app.store.registrations().await.remove(0);
    assert_eq!(
        registration.registered_by.map(|u| u.to_string()),
        Some("user-42".to_string())
    );
}

// =============================================================================
// Payment
// =============================================================================

#[tokio::test]
async fn gateway_rejection_maps_to_unauthorized() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    app.gateway.fail_initialize(PaymentError::Unauthorized);

    let (status, body) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(vip.id, 1),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn payment_endpoint_resumes_open_checkout() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    let (_, registered) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(vip.id, 1),
        ),
    )
    .await;

    let (status, body) = send(
        router(&app),
        post_json(
            "/payment",
            json!({
                "registrationId": registered["registrationId"],
                "buyerEmail": "ada@example.com",
                "buyerName": "Ada Obi",
                "paymentInstrument": { "method": "card" }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference"], registered["payment"]["reference"]);
    assert_eq!(app.gateway.initialize_calls().len(), 1);
}

// =============================================================================
// Webhook
// =============================================================================

fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

#[tokio::test]
async fn webhook_settles_and_acknowledges_duplicates() {
    let app = TestApp::new().await;
    let vip = app.add_ticket_type("VIP", "50.00", 10).await;
    send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(vip.id, 1),
        ),
    )
    .await;
    let payload = webhook_body("charge.success", "ref_1");
    let signature = sign_payload(WEBHOOK_SECRET, &payload);

    let (first, body) = send(
        router(&app),
        webhook_request(payload.clone(), Some(signature.clone())),
    )
    .await;
    let (second, _) = send(router(&app), webhook_request(payload, Some(signature))).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(body["received"], true);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(app.store.tickets().await.len(), 1);
}

#[tokio::test]
async fn webhook_with_bad_signature_is_forbidden() {
    let app = TestApp::new().await;
    let payload = webhook_body("charge.success", "ref_1");

    let (status, body) = send(
        router(&app),
        webhook_request(payload, Some("00".repeat(64))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], "INVALID_SIGNATURE");
}

// =============================================================================
// Verification and health
// =============================================================================

#[tokio::test]
async fn verify_unknown_ticket_is_not_found() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/tickets/verify/TKT-UNKNOWN")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(router(&app), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn verify_admits_issued_ticket() {
    let app = TestApp::new().await;
    let general = app.add_ticket_type("General", "0", 10).await;
    let (_, registered) = send(
        router(&app),
        post_json(
            &format!("/events/{}/registrations", app.event.id),
            registration_body(general.id, 1),
        ),
    )
    .await;
    let code = registered["tickets"][0]["code"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/tickets/verify/{}", code))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&app), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "USED");
    assert_eq!(body["admitted"], true);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = router(&app).oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn health_is_ok() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&app), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
