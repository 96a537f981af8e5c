//! Data access seam.
//!
//! Handlers and commands only see [`TicketingStore`]. Every read is scoped by
//! the caller's id (`organizer_id` or `user_id`), which is how per-row access
//! is enforced on this side of the database.

use axum::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AuthUser, Event, EventStatus, NewTicketType, OrganizerEvent, Registration,
    RegistrationDetails, RegistrationStatus, TicketType, TicketTypeUpdate,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of a guarded ticket type update.
#[derive(Debug, Clone)]
pub enum TicketTypeUpdateOutcome {
    Updated(TicketType),
    NotFound,
    /// The new quantity is below the `sold` tickets at the time of the write.
    BelowSold { sold: i32 },
}

#[async_trait]
pub trait TicketingStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    /// Resolves a session token to its user, ignoring expired sessions.
    async fn find_session_user(&self, token: &str) -> Result<Option<AuthUser>, StoreError>;

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn ticket_types_for_event(&self, event_id: Uuid) -> Result<Vec<TicketType>, StoreError>;

    /// Inserts with `available = quantity`.
    async fn insert_ticket_type(&self, ticket_type: NewTicketType) -> Result<TicketType, StoreError>;

    /// Rewrites a ticket type while keeping its sold count:
    /// `available = quantity - sold`. Nothing is written when the row is
    /// missing or the new quantity is below what has already been sold.
    async fn update_ticket_type(
        &self,
        update: TicketTypeUpdate,
    ) -> Result<TicketTypeUpdateOutcome, StoreError>;

    /// Events owned by `organizer_id`, newest first, with ticket types and stats.
    async fn organizer_events(
        &self,
        organizer_id: Uuid,
        status: Option<EventStatus>,
    ) -> Result<Vec<OrganizerEvent>, StoreError>;

    /// Registrations owned by `user_id`, newest first.
    async fn user_registrations(
        &self,
        user_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<RegistrationDetails>, StoreError>;

    async fn find_registration_by_qr(
        &self,
        event_id: Uuid,
        qr_code: &str,
    ) -> Result<Option<Registration>, StoreError>;

    /// Moves a registration from `confirmed` to `checked_in`.
    /// Returns `None` if it was not `confirmed` at the time of the write.
    async fn mark_checked_in(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Registration>, StoreError>;
}
