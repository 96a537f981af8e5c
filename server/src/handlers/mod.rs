use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::commands::codes;
use crate::context::AppState;
use crate::utils::response::success;
use crate::utils::AppError;

pub mod check_in;
pub mod my;
pub mod ticket_types;

pub use check_in::check_in_attendee;
pub use my::{list_my_events, list_my_registrations};
pub use ticket_types::configure_ticket_type;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    let payload = HealthPayload {
        status: "ok",
        service: "ticketing-api",
    };
    Ok(success(
        StatusCode::OK,
        payload,
        Some("Health check successful".to_string()),
    ))
}

/// A path segment that does not decode to a UUID cannot name an event.
fn event_id_from_path(path: Result<Path<String>, PathRejection>) -> Result<Uuid, AppError> {
    let not_found = || AppError::Rejected {
        code: codes::EVENT_NOT_FOUND,
        message: "Event not found".to_string(),
    };

    let Path(raw) = path.map_err(|rejection| {
        debug!(error = %rejection, "Undecodable event id in path");
        not_found()
    })?;
    Uuid::parse_str(&raw).map_err(|_| not_found())
}
