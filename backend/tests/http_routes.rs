//! REST API tests driven through the router with `tower::ServiceExt::oneshot`.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use slotbook::db::{FullRepository, LocalRepository};
use slotbook::http::{create_router, AppState};
use slotbook::services::FixedClock;
use tower::ServiceExt;

use support::monday_morning;

fn app() -> Router {
    let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
    let state = AppState::new(repo).with_clock(Arc::new(FixedClock(monday_morning())));
    create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_intro(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/event-types",
        Some(json!({ "name": "Intro", "slug": "intro", "duration_minutes": 30 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

fn booking_body(event_type_id: i64, start: &str) -> Value {
    json!({
        "event_type_id": event_type_id,
        "start_time": start,
        "invitee_name": "Ada Lovelace",
        "invitee_email": "ada@example.com"
    })
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_slots_and_booking_flow() {
    let app = app();
    let et = create_intro(&app).await;

    let (status, body) =
        send(&app, Method::GET, "/api/bookings/slots/intro/2026-10-21", None).await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0]["formatted"], "09:00");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(booking_body(et, "2026-10-21T10:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["end_time"], "2026-10-21T10:30:00");
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(booking_body(et, "2026-10-21T10:15:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLOT_UNAVAILABLE");

    let (_, body) = send(&app, Method::GET, "/api/bookings/slots/intro/2026-10-21", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 15);

    let uri = format!("/api/bookings/{}/reschedule", booking_id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "new_start_time": "2026-10-21T15:00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rescheduled");

    let uri = format!("/api/bookings/{}/cancel", booking_id);
    let (status, body) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_CANCELLED");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();

    let (status, body) =
        send(&app, Method::GET, "/api/bookings/slots/ghost/2026-10-21", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/api/bookings/slots/ghost/tomorrow", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/bookings/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let et = create_intro(&app).await;
    let mut invalid = booking_body(et, "2026-10-21T09:00:00");
    invalid["invitee_email"] = json!("nope");
    let (status, body) = send(&app, Method::POST, "/api/bookings", Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/event-types",
        Some(json!({ "name": "Again", "slug": "intro", "duration_minutes": 15 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "SLUG_TAKEN");
}

#[tokio::test]
async fn test_event_type_routes() {
    let app = app();
    let et = create_intro(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/event-types/slug/intro", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], et);

    let (_, body) = send(&app, Method::GET, "/api/event-types/check-slug?slug=intro", None).await;
    assert_eq!(body["data"]["available"], false);

    let uri = format!("/api/event-types/{}", et);
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "is_active": false }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);

    let (status, body) =
        send(&app, Method::GET, "/api/bookings/slots/intro/2026-10-21", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EVENT_TYPE_INACTIVE");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/api/event-types", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_availability_routes() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/availability/default", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rules"][0]["start_time"], "09:00");
    let availability_id = body["data"]["id"].as_i64().unwrap();

    let uri = format!("/api/availability/{}/overrides", availability_id);
    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "date": "2026-10-21", "is_unavailable": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let override_id = body["data"]["id"].as_i64().unwrap();

    create_intro(&app).await;
    let (_, body) = send(&app, Method::GET, "/api/bookings/slots/intro/2026-10-21", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let uri = format!("/api/availability/overrides/{}", override_id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/api/bookings/slots/intro/2026-10-21", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn test_meeting_routes() {
    let app = app();
    let et = create_intro(&app).await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(booking_body(et, "2026-10-21T09:00:00")),
    )
    .await;
    let booking_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, "/api/meetings?filter=upcoming", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/meetings?filter=someday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/meetings/{}/cancel", booking_id);
    let (status, _) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/meetings/counts", None).await;
    assert_eq!(body["data"]["upcoming"], 0);
    assert_eq!(body["data"]["cancelled"], 1);

    let uri = format!("/api/meetings/{}", booking_id);
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
}
