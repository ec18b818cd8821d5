use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tombstone state of a vote row. Only `Live` rows count toward summaries;
/// the other states keep the audit trail intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "vote_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    Live,
    Superseded,
    Removed,
}

/// The atomic scoring fact. `final_points` is derived at write time and
/// must always equal `base_points * weight_multiplier` rounded to 2 dp.
/// Rows of one submission share a `ballot_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vote {
    pub vote_id: Uuid,
    pub ballot_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub entry_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub place: Option<i32>,
    pub rating: Option<Decimal>,
    pub base_points: Decimal,
    pub weight_multiplier: Decimal,
    pub final_points: Decimal,
    pub status: VoteStatus,
    pub removed_reason: Option<String>,
    pub removed_by: Option<Uuid>,
    pub voter_ip: Option<String>,
    pub voter_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn is_live(&self) -> bool {
        self.status == VoteStatus::Live
    }
}
