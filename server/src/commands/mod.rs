//! Domain commands.
//!
//! A command takes one typed input, performs at most one write through the
//! store and returns a [`CommandResult`]. Domain rejections carry a stable
//! code from [`codes`]; the HTTP layer turns that code into a status with
//! [`crate::utils::status::status_for_error_code`].

use thiserror::Error;

use crate::store::StoreError;

pub mod check_in;
pub mod ticket_type;

pub use check_in::{check_in_attendee, CheckInInput};
pub use ticket_type::{configure_ticket_type, ConfigureTicketTypeInput};

pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const EVENT_NOT_FOUND: &str = "EVENT_NOT_FOUND";
    pub const TICKET_TYPE_NOT_FOUND: &str = "TICKET_TYPE_NOT_FOUND";
    pub const REGISTRATION_NOT_FOUND: &str = "REGISTRATION_NOT_FOUND";
    pub const DUPLICATE_TICKET_NAME: &str = "DUPLICATE_TICKET_NAME";
    pub const INVALID_EVENT_STATUS: &str = "INVALID_EVENT_STATUS";
    pub const INVALID_QUANTITY: &str = "INVALID_QUANTITY";
    pub const INVALID_REGISTRATION_STATUS: &str = "INVALID_REGISTRATION_STATUS";
    pub const ALREADY_CHECKED_IN: &str = "ALREADY_CHECKED_IN";
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{message}")]
    Rejected { code: &'static str, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CommandError {
    pub fn rejected(code: &'static str, message: impl Into<String>) -> Self {
        CommandError::Rejected {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            CommandError::Rejected { code, .. } => Some(*code),
            CommandError::Store(_) => None,
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
