use std::collections::HashMap;

use axum::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TicketTypeUpdateOutcome, TicketingStore};
use crate::models::{
    AuthUser, Event, EventStats, EventStatus, EventSummary, NewTicketType, OrganizerEvent,
    Registration, RegistrationDetails, RegistrationStatus, TicketType, TicketTypeSummary,
    TicketTypeUpdate,
};

struct Session {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    offline: bool,
    users: HashMap<Uuid, AuthUser>,
    sessions: HashMap<String, Session>,
    events: HashMap<Uuid, Event>,
    ticket_types: HashMap<Uuid, TicketType>,
    registrations: HashMap<Uuid, Registration>,
}

impl MemoryState {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    /// Mirrors the `(event_id, lower(name))` unique index.
    fn name_taken(&self, event_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        let name = name.to_lowercase();
        self.ticket_types.values().any(|t| {
            t.event_id == event_id && Some(t.id) != except && t.name.to_lowercase() == name
        })
    }

    fn ticket_types_for(&self, event_id: Uuid) -> Vec<TicketType> {
        let mut types: Vec<TicketType> = self
            .ticket_types
            .values()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect();
        types.sort_by_key(|t| t.created_at);
        types
    }
}

/// In-process store with the same observable behavior as [`super::PgStore`].
/// Seeded directly through the `add_*` methods.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every trait call fails with [`StoreError::Unavailable`].
    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    pub async fn add_user(&self, email: &str) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        self.state.write().await.users.insert(user.id, user.clone());
        user
    }

    pub async fn add_session(&self, user_id: Uuid, token: &str, expires_at: DateTime<Utc>) {
        self.state.write().await.sessions.insert(
            token.to_string(),
            Session {
                user_id,
                expires_at,
            },
        );
    }

    pub async fn add_event(&self, event: Event) {
        self.state.write().await.events.insert(event.id, event);
    }

    pub async fn add_ticket_type(&self, ticket_type: TicketType) {
        self.state
            .write()
            .await
            .ticket_types
            .insert(ticket_type.id, ticket_type);
    }

    pub async fn add_registration(&self, registration: Registration) {
        self.state
            .write()
            .await
            .registrations
            .insert(registration.id, registration);
    }
}

#[async_trait]
impl TicketingStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.state.read().await.check_online()
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<AuthUser>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;

        let user = state
            .sessions
            .get(token)
            .filter(|session| session.expires_at > Utc::now())
            .and_then(|session| state.users.get(&session.user_id))
            .cloned();
        Ok(user)
    }

    async fn find_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.events.get(&event_id).cloned())
    }

    async fn ticket_types_for_event(&self, event_id: Uuid) -> Result<Vec<TicketType>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;
        Ok(state.ticket_types_for(event_id))
    }

    async fn insert_ticket_type(&self, ticket_type: NewTicketType) -> Result<TicketType, StoreError> {
        let mut state = self.state.write().await;
        state.check_online()?;

        if state.name_taken(ticket_type.event_id, &ticket_type.name, None) {
            return Err(StoreError::UniqueViolation(
                "ticket_types_event_name_key".to_string(),
            ));
        }

        let now = Utc::now();
        let created = TicketType {
            id: Uuid::new_v4(),
            event_id: ticket_type.event_id,
            name: ticket_type.name,
            description: ticket_type.description,
            price: ticket_type.price,
            quantity: ticket_type.quantity,
            available: ticket_type.quantity,
            created_at: now,
            updated_at: now,
        };
        state.ticket_types.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_ticket_type(
        &self,
        update: TicketTypeUpdate,
    ) -> Result<TicketTypeUpdateOutcome, StoreError> {
        let mut state = self.state.write().await;
        state.check_online()?;

        if state.name_taken(update.event_id, &update.name, Some(update.id)) {
            return Err(StoreError::UniqueViolation(
                "ticket_types_event_name_key".to_string(),
            ));
        }

        let Some(existing) = state
            .ticket_types
            .get_mut(&update.id)
            .filter(|t| t.event_id == update.event_id)
        else {
            return Ok(TicketTypeUpdateOutcome::NotFound);
        };

        let sold = existing.sold();
        if update.quantity < sold {
            return Ok(TicketTypeUpdateOutcome::BelowSold { sold });
        }

        existing.name = update.name;
        existing.description = update.description;
        existing.price = update.price;
        existing.quantity = update.quantity;
        existing.available = update.quantity - sold;
        existing.updated_at = Utc::now();
        Ok(TicketTypeUpdateOutcome::Updated(existing.clone()))
    }

    async fn organizer_events(
        &self,
        organizer_id: Uuid,
        status: Option<EventStatus>,
    ) -> Result<Vec<OrganizerEvent>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;

        let mut events: Vec<&Event> = state
            .events
            .values()
            .filter(|e| e.organizer_id == organizer_id)
            .filter(|e| status.map_or(true, |s| e.status == s))
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let result = events
            .into_iter()
            .map(|event| {
                let registrations = state
                    .registrations
                    .values()
                    .filter(|r| r.event_id == event.id);
                let (registered, checked_in) =
                    registrations.fold((0_i64, 0_i64), |(registered, checked_in), r| {
                        (
                            registered + i64::from(r.status.is_active()),
                            checked_in + i64::from(r.status == RegistrationStatus::CheckedIn),
                        )
                    });

                let ticket_types = state.ticket_types_for(event.id);
                let stats = EventStats::compute(&ticket_types, registered, checked_in);
                OrganizerEvent {
                    event: event.clone(),
                    ticket_types,
                    stats,
                }
            })
            .collect();

        Ok(result)
    }

    async fn user_registrations(
        &self,
        user_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<RegistrationDetails>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;

        let mut registrations: Vec<&Registration> = state
            .registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // Inner-join semantics: rows whose event or ticket type is gone are skipped.
        let details = registrations
            .into_iter()
            .filter_map(|registration| {
                let event = state.events.get(&registration.event_id)?;
                let ticket_type = state.ticket_types.get(&registration.ticket_type_id)?;
                Some(RegistrationDetails {
                    registration: registration.clone(),
                    event: EventSummary {
                        id: event.id,
                        slug: event.slug.clone(),
                        title: event.title.clone(),
                        start_date: event.start_date,
                        end_date: event.end_date,
                        location: event.location.clone(),
                        status: event.status,
                    },
                    ticket_type: TicketTypeSummary {
                        id: ticket_type.id,
                        name: ticket_type.name.clone(),
                        description: ticket_type.description.clone(),
                        price: ticket_type.price,
                    },
                })
            })
            .collect();

        Ok(details)
    }

    async fn find_registration_by_qr(
        &self,
        event_id: Uuid,
        qr_code: &str,
    ) -> Result<Option<Registration>, StoreError> {
        let state = self.state.read().await;
        state.check_online()?;

        let registration = state
            .registrations
            .values()
            .find(|r| r.event_id == event_id && r.qr_code == qr_code)
            .cloned();
        Ok(registration)
    }

    async fn mark_checked_in(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Registration>, StoreError> {
        let mut state = self.state.write().await;
        state.check_online()?;

        let Some(registration) = state
            .registrations
            .get_mut(&registration_id)
            .filter(|r| r.status == RegistrationStatus::Confirmed)
        else {
            return Ok(None);
        };

        registration.status = RegistrationStatus::CheckedIn;
        registration.checked_in_at = Some(at);
        Ok(Some(registration.clone()))
    }
}
