use std::collections::HashMap;

use axum::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use uuid::Uuid;

use super::{StoreError, TicketTypeUpdateOutcome, TicketingStore};
use crate::models::{
    AuthUser, Event, EventStats, EventStatus, EventSummary, NewTicketType, OrganizerEvent,
    Registration, RegistrationDetails, RegistrationStatus, TicketType, TicketTypeSummary,
    TicketTypeUpdate,
};

const EVENT_COLUMNS: &str = "e.id, e.organizer_id, e.slug, e.title, e.description, e.start_date, \
     e.end_date, e.location, e.capacity, e.status, e.created_at, e.updated_at";

const TICKET_TYPE_COLUMNS: &str =
    "id, event_id, name, description, price, quantity, available, created_at, updated_at";

const REGISTRATION_COLUMNS: &str =
    "id, user_id, event_id, ticket_type_id, status, qr_code, checked_in_at, created_at";

#[derive(FromRow)]
struct OrganizerEventRow {
    #[sqlx(flatten)]
    event: Event,
    registered_count: i64,
    checked_in_count: i64,
}

#[derive(FromRow)]
struct RegistrationDetailsRow {
    #[sqlx(flatten)]
    registration: Registration,
    event_slug: String,
    event_title: String,
    event_start_date: DateTime<Utc>,
    event_end_date: DateTime<Utc>,
    event_location: Option<String>,
    #[sqlx(try_from = "String")]
    event_status: EventStatus,
    ticket_type_name: String,
    ticket_type_description: Option<String>,
    ticket_type_price: Decimal,
}

impl From<RegistrationDetailsRow> for RegistrationDetails {
    fn from(row: RegistrationDetailsRow) -> Self {
        let event = EventSummary {
            id: row.registration.event_id,
            slug: row.event_slug,
            title: row.event_title,
            start_date: row.event_start_date,
            end_date: row.event_end_date,
            location: row.event_location,
            status: row.event_status,
        };
        let ticket_type = TicketTypeSummary {
            id: row.registration.ticket_type_id,
            name: row.ticket_type_name,
            description: row.ticket_type_description,
            price: row.ticket_type_price,
        };

        Self {
            registration: row.registration,
            event,
            ticket_type,
        }
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

/// Unique violations are surfaced separately so commands can report them as conflicts.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::UniqueViolation(constraint);
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl TicketingStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<AuthUser>, StoreError> {
        let user = sqlx::query_as::<_, AuthUser>(
            r"
            SELECT u.id, u.email
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1");
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn ticket_types_for_event(&self, event_id: Uuid) -> Result<Vec<TicketType>, StoreError> {
        let query = format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE event_id = $1 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, TicketType>(&query)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn insert_ticket_type(&self, ticket_type: NewTicketType) -> Result<TicketType, StoreError> {
        let query = format!(
            r"
            INSERT INTO ticket_types (id, event_id, name, description, price, quantity, available)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {TICKET_TYPE_COLUMNS}
            "
        );
        sqlx::query_as::<_, TicketType>(&query)
            .bind(Uuid::new_v4())
            .bind(ticket_type.event_id)
            .bind(&ticket_type.name)
            .bind(&ticket_type.description)
            .bind(ticket_type.price)
            .bind(ticket_type.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update_ticket_type(
        &self,
        update: TicketTypeUpdate,
    ) -> Result<TicketTypeUpdateOutcome, StoreError> {
        // SET expressions read the pre-update row, so `quantity - available` is the sold count.
        let query = format!(
            r"
            UPDATE ticket_types
            SET name = $3,
                description = $4,
                price = $5,
                available = $6 - (quantity - available),
                quantity = $6,
                updated_at = NOW()
            WHERE id = $1 AND event_id = $2 AND quantity - available <= $6
            RETURNING {TICKET_TYPE_COLUMNS}
            "
        );
        let updated = sqlx::query_as::<_, TicketType>(&query)
            .bind(update.id)
            .bind(update.event_id)
            .bind(&update.name)
            .bind(&update.description)
            .bind(update.price)
            .bind(update.quantity)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        if let Some(ticket_type) = updated {
            return Ok(TicketTypeUpdateOutcome::Updated(ticket_type));
        }

        // The guard rejected the write; find out which half of it failed.
        let sold: Option<i32> = sqlx::query_scalar(
            "SELECT quantity - available FROM ticket_types WHERE id = $1 AND event_id = $2",
        )
        .bind(update.id)
        .bind(update.event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match sold {
            Some(sold) => TicketTypeUpdateOutcome::BelowSold { sold },
            None => TicketTypeUpdateOutcome::NotFound,
        })
    }

    async fn organizer_events(
        &self,
        organizer_id: Uuid,
        status: Option<EventStatus>,
    ) -> Result<Vec<OrganizerEvent>, StoreError> {
        let query = format!(
            r"
            SELECT {EVENT_COLUMNS},
                   COALESCE(r.registered_count, 0) AS registered_count,
                   COALESCE(r.checked_in_count, 0) AS checked_in_count
            FROM events e
            LEFT JOIN (
                SELECT event_id,
                       COUNT(*) FILTER (WHERE status IN ('confirmed', 'checked_in')) AS registered_count,
                       COUNT(*) FILTER (WHERE status = 'checked_in') AS checked_in_count
                FROM registrations
                GROUP BY event_id
            ) r ON r.event_id = e.id
            WHERE e.organizer_id = $1 AND ($2::text IS NULL OR e.status = $2)
            ORDER BY e.created_at DESC
            "
        );
        let rows = sqlx::query_as::<_, OrganizerEventRow>(&query)
            .bind(organizer_id)
            .bind(status.map(EventStatus::as_str))
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<Uuid> = rows.iter().map(|row| row.event.id).collect();
        let query = format!(
            "SELECT {TICKET_TYPE_COLUMNS} FROM ticket_types WHERE event_id = ANY($1) ORDER BY created_at"
        );
        let ticket_types = sqlx::query_as::<_, TicketType>(&query)
            .bind(&event_ids[..])
            .fetch_all(&self.pool)
            .await?;

        let mut by_event: HashMap<Uuid, Vec<TicketType>> = HashMap::new();
        for ticket_type in ticket_types {
            by_event.entry(ticket_type.event_id).or_default().push(ticket_type);
        }

        let events = rows
            .into_iter()
            .map(|row| {
                let ticket_types = by_event.remove(&row.event.id).unwrap_or_default();
                let stats =
                    EventStats::compute(&ticket_types, row.registered_count, row.checked_in_count);
                OrganizerEvent {
                    event: row.event,
                    ticket_types,
                    stats,
                }
            })
            .collect();

        Ok(events)
    }

    async fn user_registrations(
        &self,
        user_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<RegistrationDetails>, StoreError> {
        let rows = sqlx::query_as::<_, RegistrationDetailsRow>(
            r"
            SELECT r.id, r.user_id, r.event_id, r.ticket_type_id, r.status, r.qr_code,
                   r.checked_in_at, r.created_at,
                   e.slug AS event_slug,
                   e.title AS event_title,
                   e.start_date AS event_start_date,
                   e.end_date AS event_end_date,
                   e.location AS event_location,
                   e.status AS event_status,
                   t.name AS ticket_type_name,
                   t.description AS ticket_type_description,
                   t.price AS ticket_type_price
            FROM registrations r
            JOIN events e ON e.id = r.event_id
            JOIN ticket_types t ON t.id = r.ticket_type_id
            WHERE r.user_id = $1 AND ($2::text IS NULL OR r.status = $2)
            ORDER BY r.created_at DESC
            ",
        )
        .bind(user_id)
        .bind(status.map(RegistrationStatus::as_str))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RegistrationDetails::from).collect())
    }

    async fn find_registration_by_qr(
        &self,
        event_id: Uuid,
        qr_code: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND qr_code = $2"
        );
        let registration = sqlx::query_as::<_, Registration>(&query)
            .bind(event_id)
            .bind(qr_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }

    async fn mark_checked_in(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Registration>, StoreError> {
        let query = format!(
            r"
            UPDATE registrations
            SET status = 'checked_in', checked_in_at = $2
            WHERE id = $1 AND status = 'confirmed'
            RETURNING {REGISTRATION_COLUMNS}
            "
        );
        let registration = sqlx::query_as::<_, Registration>(&query)
            .bind(registration_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(registration)
    }
}
