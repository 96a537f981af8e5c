//! Router harness backed by a seeded `MemoryStore`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ticketing_server::config::HttpConfig;
use ticketing_server::context::AppState;
use ticketing_server::models::{
    AuthUser, Event, EventStatus, Registration, RegistrationStatus, TicketType,
};
use ticketing_server::routes::create_routes;
use ticketing_server::store::MemoryStore;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub router: Router,
    pub user: AuthUser,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("organizer@example.com").await;
        let token = format!("session-{}", Uuid::new_v4());
        store
            .add_session(user.id, &token, Utc::now() + Duration::hours(1))
            .await;

        let router = create_routes(AppState::new(store.clone()), &HttpConfig::default());

        Self {
            store,
            router,
            user,
            token,
        }
    }

    /// Adds another user with a live session and returns it with its token.
    pub async fn add_user(&self, email: &str) -> (AuthUser, String) {
        let user = self.store.add_user(email).await;
        let token = format!("session-{}", Uuid::new_v4());
        self.store
            .add_session(user.id, &token, Utc::now() + Duration::hours(1))
            .await;
        (user, token)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }
}

pub fn post_json(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn event(organizer_id: Uuid, status: EventStatus, created_at: DateTime<Utc>) -> Event {
    let id = Uuid::new_v4();
    Event {
        id,
        organizer_id,
        slug: format!("event-{}", id.simple()),
        title: format!("Event {}", status),
        description: None,
        start_date: created_at + Duration::days(30),
        end_date: created_at + Duration::days(30) + Duration::hours(4),
        location: Some("Lisbon".to_string()),
        capacity: Some(500),
        status,
        created_at,
        updated_at: created_at,
    }
}

pub fn ticket_type(event_id: Uuid, name: &str, quantity: i32, available: i32) -> TicketType {
    let now = Utc::now();
    TicketType {
        id: Uuid::new_v4(),
        event_id,
        name: name.to_string(),
        description: Some(format!("{name} admission")),
        price: Decimal::new(4000, 2),
        quantity,
        available,
        created_at: now,
        updated_at: now,
    }
}

pub fn registration(
    user_id: Uuid,
    ticket_type: &TicketType,
    status: RegistrationStatus,
    created_at: DateTime<Utc>,
) -> Registration {
    Registration {
        id: Uuid::new_v4(),
        user_id,
        event_id: ticket_type.event_id,
        ticket_type_id: ticket_type.id,
        status,
        qr_code: format!("QR-{}", Uuid::new_v4().simple()),
        checked_in_at: (status == RegistrationStatus::CheckedIn).then_some(created_at),
        created_at,
    }
}
