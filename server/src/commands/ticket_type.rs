use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{codes, CommandError, CommandResult};
use crate::models::{NewTicketType, TicketType, TicketTypeUpdate};
use crate::store::{StoreError, TicketTypeUpdateOutcome, TicketingStore};

const NAME_MIN_CHARS: usize = 3;
const NAME_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;
const QUANTITY_MAX: i64 = 100_000;
const PRICE_MAX_SCALE: u32 = 2;

/// Largest price a `NUMERIC(10, 2)` column holds: 99999999.99.
fn price_max() -> Decimal {
    Decimal::new(9_999_999_999, PRICE_MAX_SCALE)
}

/// Create-or-update request for a ticket type. `ticket_type_id` selects update.
#[derive(Debug, Clone)]
pub struct ConfigureTicketTypeInput {
    pub event_id: Uuid,
    pub organizer_id: Uuid,
    pub ticket_type_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
}

struct ValidTicketType {
    name: String,
    description: Option<String>,
    price: Decimal,
    quantity: i32,
}

fn validate(input: &ConfigureTicketTypeInput) -> CommandResult<ValidTicketType> {
    let name = input.name.trim();
    let name_chars = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_chars) {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            format!("Name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"),
        ));
    }

    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }

    if input.price < Decimal::ZERO {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            "Price cannot be negative",
        ));
    }
    if input.price > price_max() {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            format!("Price cannot exceed {}", price_max()),
        ));
    }
    if input.price.normalize().scale() > PRICE_MAX_SCALE {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            format!("Price cannot have more than {PRICE_MAX_SCALE} decimal places"),
        ));
    }

    if !(1..=QUANTITY_MAX).contains(&input.quantity) {
        return Err(CommandError::rejected(
            codes::VALIDATION_ERROR,
            format!("Quantity must be between 1 and {QUANTITY_MAX}"),
        ));
    }

    Ok(ValidTicketType {
        name: name.to_string(),
        description: description.map(str::to_string),
        price: input.price,
        // Range-checked above.
        quantity: input.quantity as i32,
    })
}

fn duplicate_name() -> CommandError {
    CommandError::rejected(
        codes::DUPLICATE_TICKET_NAME,
        "A ticket type with this name already exists for this event",
    )
}

fn ticket_type_not_found() -> CommandError {
    CommandError::rejected(codes::TICKET_TYPE_NOT_FOUND, "Ticket type not found")
}

fn lowered_quantity() -> CommandError {
    CommandError::rejected(
        codes::INVALID_QUANTITY,
        "Quantity cannot be lower than the number of tickets already sold",
    )
}

/// The unique index may still catch a name that raced past the pre-check.
fn map_store_write(err: StoreError) -> CommandError {
    match err {
        StoreError::UniqueViolation(_) => duplicate_name(),
        other => CommandError::Store(other),
    }
}

/// Creates a ticket type, or updates one when `ticket_type_id` is set.
///
/// Checks run in order: field rules, event exists, caller owns the event,
/// event still accepts ticket changes, (update) ticket type exists and keeps
/// its sold tickets, name unique within the event. At most one write is issued.
#[instrument(
    skip(store, input),
    fields(event_id = %input.event_id, organizer_id = %input.organizer_id, update = input.ticket_type_id.is_some())
)]
pub async fn configure_ticket_type(
    store: &dyn TicketingStore,
    input: ConfigureTicketTypeInput,
) -> CommandResult<TicketType> {
    let valid = validate(&input)?;

    let event = store
        .find_event(input.event_id)
        .await?
        .ok_or_else(|| CommandError::rejected(codes::EVENT_NOT_FOUND, "Event not found"))?;

    if event.organizer_id != input.organizer_id {
        return Err(CommandError::rejected(
            codes::UNAUTHORIZED,
            "You do not have permission to manage this event",
        ));
    }

    if !event.status.accepts_ticket_changes() {
        return Err(CommandError::rejected(
            codes::INVALID_EVENT_STATUS,
            format!("Cannot configure ticket types for a {} event", event.status),
        ));
    }

    let siblings = store.ticket_types_for_event(event.id).await?;
    let lowered = valid.name.to_lowercase();
    let name_taken = |except: Option<Uuid>| {
        siblings
            .iter()
            .any(|t| Some(t.id) != except && t.name.to_lowercase() == lowered)
    };

    match input.ticket_type_id {
        Some(ticket_type_id) => {
            let current = siblings
                .iter()
                .find(|t| t.id == ticket_type_id)
                .ok_or_else(ticket_type_not_found)?;

            if valid.quantity < current.sold() {
                return Err(lowered_quantity());
            }
            if name_taken(Some(ticket_type_id)) {
                return Err(duplicate_name());
            }

            // Sales or deletes may land between the read above and this write.
            let outcome = store
                .update_ticket_type(TicketTypeUpdate {
                    id: ticket_type_id,
                    event_id: event.id,
                    name: valid.name,
                    description: valid.description,
                    price: valid.price,
                    quantity: valid.quantity,
                })
                .await
                .map_err(map_store_write)?;
            let updated = match outcome {
                TicketTypeUpdateOutcome::Updated(ticket_type) => ticket_type,
                TicketTypeUpdateOutcome::NotFound => return Err(ticket_type_not_found()),
                TicketTypeUpdateOutcome::BelowSold { .. } => return Err(lowered_quantity()),
            };

            info!(ticket_type_id = %updated.id, "Ticket type updated");
            Ok(updated)
        }
        None => {
            if name_taken(None) {
                return Err(duplicate_name());
            }

            let created = store
                .insert_ticket_type(NewTicketType {
                    event_id: event.id,
                    name: valid.name,
                    description: valid.description,
                    price: valid.price,
                    quantity: valid.quantity,
                })
                .await
                .map_err(map_store_write)?;

            info!(ticket_type_id = %created.id, "Ticket type created");
            Ok(created)
        }
    }
}
