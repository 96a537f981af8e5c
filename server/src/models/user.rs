use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Identity resolved from a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}
