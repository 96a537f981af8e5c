use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{codes, CommandError, CommandResult};
use crate::models::{Registration, RegistrationStatus};
use crate::store::TicketingStore;

#[derive(Debug, Clone)]
pub struct CheckInInput {
    pub event_id: Uuid,
    pub organizer_id: Uuid,
    pub qr_code: String,
}

fn already_checked_in() -> CommandError {
    CommandError::rejected(
        codes::ALREADY_CHECKED_IN,
        "Attendee has already been checked in",
    )
}

/// Checks in the attendee holding `qr_code` for an event owned by the caller.
#[instrument(skip(store, input), fields(event_id = %input.event_id, organizer_id = %input.organizer_id))]
pub async fn check_in_attendee(
    store: &dyn TicketingStore,
    input: CheckInInput,
) -> CommandResult<Registration> {
    let event = store
        .find_event(input.event_id)
        .await?
        .ok_or_else(|| CommandError::rejected(codes::EVENT_NOT_FOUND, "Event not found"))?;

    if event.organizer_id != input.organizer_id {
        return Err(CommandError::rejected(
            codes::UNAUTHORIZED,
            "You do not have permission to check in attendees for this event",
        ));
    }

    let registration = store
        .find_registration_by_qr(event.id, input.qr_code.trim())
        .await?
        .ok_or_else(|| {
            CommandError::rejected(codes::REGISTRATION_NOT_FOUND, "Registration not found")
        })?;

    match registration.status {
        RegistrationStatus::CheckedIn => return Err(already_checked_in()),
        RegistrationStatus::Cancelled => {
            return Err(CommandError::rejected(
                codes::INVALID_REGISTRATION_STATUS,
                "Cancelled registrations cannot be checked in",
            ))
        }
        RegistrationStatus::Confirmed => {}
    }

    // A concurrent check-in wins the conditional update; report it the same way.
    let checked_in = store
        .mark_checked_in(registration.id, Utc::now())
        .await?
        .ok_or_else(already_checked_in)?;

    info!(registration_id = %checked_in.id, "Attendee checked in");
    Ok(checked_in)
}
