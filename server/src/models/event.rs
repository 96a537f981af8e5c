use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{TicketType, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    /// Ticket types may only be configured while the event can still sell them.
    pub fn accepts_ticket_changes(self) -> bool {
        matches!(self, EventStatus::Draft | EventStatus::Published)
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            "cancelled" => Ok(EventStatus::Cancelled),
            "completed" => Ok(EventStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attendance and inventory figures shown on the organizer dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub registered_count: i64,
    pub checked_in_count: i64,
    pub total_tickets: i64,
    pub available_tickets: i64,
    pub sold_tickets: i64,
    pub is_full: bool,
}

impl EventStats {
    /// `registered_count` covers confirmed and checked-in registrations.
    /// An event without ticket types reports itself as full.
    pub fn compute(ticket_types: &[TicketType], registered_count: i64, checked_in_count: i64) -> Self {
        let total_tickets: i64 = ticket_types.iter().map(|t| i64::from(t.quantity)).sum();
        let available_tickets: i64 = ticket_types.iter().map(|t| i64::from(t.available)).sum();

        Self {
            registered_count,
            checked_in_count,
            total_tickets,
            available_tickets,
            sold_tickets: total_tickets - available_tickets,
            is_full: available_tickets == 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerEvent {
    #[serde(flatten)]
    pub event: Event,
    pub ticket_types: Vec<TicketType>,
    pub stats: EventStats,
}
