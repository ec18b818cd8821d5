use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Optional owner of one or more entries. Used for self-voting checks and
/// labeling, never for scoring.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Participant {
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Option<Uuid>,
    pub display_name: String,
}
