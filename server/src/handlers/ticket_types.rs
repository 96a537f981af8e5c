use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;
use tracing::instrument;

use super::event_id_from_path;
use crate::commands::{self, ConfigureTicketTypeInput};
use crate::context::RequestContext;
use crate::utils::response::success;
use crate::utils::AppError;
use crate::validation::parse_configure_ticket_type;

/// `POST /api/events/:event_id/ticket-types`
///
/// Creates a ticket type (`201`) or, when the body carries `ticketTypeId`,
/// updates it (`200`). Authentication is checked before the body is parsed.
#[instrument(skip(ctx, body))]
pub async fn configure_ticket_type(
    ctx: RequestContext,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let user = ctx.require_user()?;

    let body: Value = serde_json::from_slice(&body?)?;
    let request = parse_configure_ticket_type(&body)?;
    let event_id = event_id_from_path(path)?;

    let is_update = request.ticket_type_id.is_some();
    let input = ConfigureTicketTypeInput {
        event_id,
        organizer_id: user.id,
        ticket_type_id: request.ticket_type_id,
        name: request.name,
        description: request.description,
        price: request.price,
        quantity: request.quantity,
    };
    let ticket_type = commands::configure_ticket_type(ctx.store(), input).await?;

    let (status, message) = if is_update {
        (StatusCode::OK, "Ticket type updated successfully")
    } else {
        (StatusCode::CREATED, "Ticket type created successfully")
    };
    Ok(success(status, ticket_type, Some(message.to_string())))
}
