//! Builders shared by the unit tests.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Event, EventStatus, Registration, RegistrationStatus, TicketType};

pub fn event(organizer_id: Uuid, status: EventStatus) -> Event {
    let now = Utc::now();
    let id = Uuid::new_v4();
    Event {
        id,
        organizer_id,
        slug: format!("event-{}", id.simple()),
        title: "Rust Meetup".to_string(),
        description: Some("Monthly meetup".to_string()),
        start_date: now + Duration::days(7),
        end_date: now + Duration::days(7) + Duration::hours(3),
        location: Some("Berlin".to_string()),
        capacity: Some(100),
        status,
        created_at: now,
        updated_at: now,
    }
}

pub fn ticket_type(event_id: Uuid, name: &str, quantity: i32, available: i32) -> TicketType {
    let now = Utc::now();
    TicketType {
        id: Uuid::new_v4(),
        event_id,
        name: name.to_string(),
        description: None,
        price: Decimal::new(2500, 2),
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
    qr_code: &str,
) -> Registration {
    Registration {
        id: Uuid::new_v4(),
        user_id,
        event_id: ticket_type.event_id,
        ticket_type_id: ticket_type.id,
        status,
        qr_code: qr_code.to_string(),
        checked_in_at: None,
        created_at: Utc::now(),
    }
}
