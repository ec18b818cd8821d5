use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Partitioning axis for entries. `division_type` groups divisions into
/// result cohorts (e.g. "Professional" vs "Amateur") independently of the
/// division itself.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Division {
    pub division_id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub division_type: Option<String>,
}
