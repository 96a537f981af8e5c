mod common;

use axum::http::StatusCode;
use chrono::Utc;
use ticketing_server::models::{EventStatus, RegistrationStatus};

use common::{event, get, post_json, registration, ticket_type, TestApp};

#[tokio::test]
async fn test_check_in_once() {
    let app = TestApp::new().await;
    let show = event(app.user.id, EventStatus::Published, Utc::now());
    let general = ticket_type(show.id, "General", 20, 19);
    let attendee = app.store.add_user("guest@example.com").await;
    let ticket = registration(attendee.id, &general, RegistrationStatus::Confirmed, Utc::now());
    let qr = ticket.qr_code.clone();
    let uri = format!("/api/events/{}/check-in", show.id);

    app.store.add_event(show).await;
    app.store.add_ticket_type(general).await;
    app.store.add_registration(ticket).await;

    let body = format!(r#"{{"qrCode":"{qr}"}}"#);
    let (status, response) = app.send(post_json(&uri, Some(&app.token), &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["status"], "checked_in");
    assert!(response["data"]["checkedInAt"].is_string());

    let (status, response) = app.send(post_json(&uri, Some(&app.token), &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["code"], "ALREADY_CHECKED_IN");

    let (_, events) = app.send(get("/api/my/events", Some(&app.token))).await;
    assert_eq!(events["data"][0]["stats"]["checkedInCount"], 1);
}

#[tokio::test]
async fn test_check_in_rejections() {
    let app = TestApp::new().await;
    let show = event(app.user.id, EventStatus::Published, Utc::now());
    let general = ticket_type(show.id, "General", 20, 19);
    let attendee = app.store.add_user("guest@example.com").await;
    let cancelled = registration(attendee.id, &general, RegistrationStatus::Cancelled, Utc::now());
    let qr = cancelled.qr_code.clone();
    let uri = format!("/api/events/{}/check-in", show.id);

    app.store.add_event(show).await;
    app.store.add_ticket_type(general).await;
    app.store.add_registration(cancelled).await;

    let (status, response) = app
        .send(post_json(&uri, Some(&app.token), &format!(r#"{{"qrCode":"{qr}"}}"#)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_REGISTRATION_STATUS");

    let (status, response) = app
        .send(post_json(&uri, Some(&app.token), r#"{"qrCode":"QR-unknown"}"#))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["code"], "REGISTRATION_NOT_FOUND");

    let (status, response) = app.send(post_json(&uri, Some(&app.token), "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["missingFields"][0], "qrCode");

    let (_, stranger) = app.add_user("stranger@example.com").await;
    let (status, _) = app
        .send(post_json(&uri, Some(&stranger), &format!(r#"{{"qrCode":"{qr}"}}"#)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unreadable_requests_get_json_errors() {
    let app = TestApp::new().await;
    let show = event(app.user.id, EventStatus::Published, Utc::now());
    let uri = format!("/api/events/{}/check-in", show.id);
    app.store.add_event(show).await;

    let (status, response) = app
        .send(post_json("/api/events/%FF/check-in", Some(&app.token), r#"{"qrCode":"QR-1"}"#))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["code"], "EVENT_NOT_FOUND");

    let oversized = format!(r#"{{"qrCode":"{}"}}"#, "Q".repeat(3 * 1024 * 1024));
    let (status, response) = app.send(post_json(&uri, Some(&app.token), &oversized)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response["error"].is_string());
}
