//! Listings scoped to the authenticated caller.
//!
//! Both endpoints accept an optional `status` query parameter. A value outside
//! the status enum is ignored and the listing is returned unfiltered.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Query;
use axum::response::Response;
use tracing::{debug, instrument};

use crate::context::RequestContext;
use crate::models::{EventStatus, RegistrationStatus};
use crate::utils::response::ok;
use crate::utils::AppError;

fn status_filter<S: FromStr>(query: &HashMap<String, String>) -> Option<S> {
    let raw = query.get("status")?;
    let parsed = raw.parse::<S>().ok();
    if parsed.is_none() {
        debug!(status = %raw, "Ignoring unknown status filter");
    }
    parsed
}

/// `GET /api/my/events`
#[instrument(skip_all)]
pub async fn list_my_events(
    ctx: RequestContext,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let user = ctx.require_user()?;
    let status: Option<EventStatus> = status_filter(&query);

    let events = ctx.store().organizer_events(user.id, status).await?;
    debug!(user_id = %user.id, count = events.len(), "Listed organizer events");
    Ok(ok(events))
}

/// `GET /api/my/registrations`
#[instrument(skip_all)]
pub async fn list_my_registrations(
    ctx: RequestContext,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let user = ctx.require_user()?;
    let status: Option<RegistrationStatus> = status_filter(&query);

    let registrations = ctx.store().user_registrations(user.id, status).await?;
    debug!(user_id = %user.id, count = registrations.len(), "Listed registrations");
    Ok(ok(registrations))
}
