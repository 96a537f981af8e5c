use std::any::Any;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, HttpConfig};
use crate::context::AppState;
use crate::handlers::{
    check_in_attendee, configure_ticket_type, health_check, list_my_events, list_my_registrations,
};
use crate::utils::AppError;

pub fn create_routes(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/events/:event_id/ticket-types",
            post(configure_ticket_type),
        )
        .route("/api/events/:event_id/check-in", post(check_in_attendee))
        .route("/api/my/events", get(list_my_events))
        .route("/api/my/registrations", get(list_my_registrations))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(http))
        .layer(create_cors_layer(&http.cors_allowed_origins))
}

/// Last-resort handler: a panicking request still gets a JSON 500.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic".to_string()
    };

    AppError::Internal(message).into_response()
}
