use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub allow_vote_changes: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Feature flag row owned by the surrounding CRUD app. The engine reads
/// these to decide whether voting and live results are enabled.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventModule {
    pub event_module_id: Uuid,
    pub event_id: Uuid,
    pub module_key: String,
    pub is_enabled: bool,
}
