use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tracing::instrument;

use super::event_id_from_path;
use crate::commands::{self, CheckInInput};
use crate::context::RequestContext;
use crate::utils::response::success;
use crate::utils::AppError;
use crate::validation::parse_check_in;

/// `POST /api/events/:event_id/check-in` with `{"qrCode": "..."}`.
#[instrument(skip(ctx, body))]
pub async fn check_in_attendee(
    ctx: RequestContext,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let user = ctx.require_user()?;

    let body: Value = serde_json::from_slice(&body?)?;
    let request = parse_check_in(&body)?;
    let event_id = event_id_from_path(path)?;

    let input = CheckInInput {
        event_id,
        organizer_id: user.id,
        qr_code: request.qr_code,
    };
    let registration = commands::check_in_attendee(ctx.store(), input).await?;

    Ok(success(
        StatusCode::OK,
        registration,
        Some("Attendee checked in successfully".to_string()),
    ))
}
