use thiserror::Error;

pub mod event;
pub mod registration;
pub mod ticket;
pub mod user;

pub use event::{Event, EventStats, EventStatus, OrganizerEvent};
pub use registration::{
    EventSummary, Registration, RegistrationDetails, RegistrationStatus, TicketTypeSummary,
};
pub use ticket::{NewTicketType, TicketType, TicketTypeUpdate};
pub use user::AuthUser;

/// Raised when a status column or query parameter holds a value outside its enum.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);
