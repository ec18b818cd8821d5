use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The votable unit. `entry_number` is the voter-facing identifier, unique
/// within its event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub entry_number: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
