use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Voter class carrying a scoring multiplier (e.g. 2.00 for a judge).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VoterWeightClass {
    pub weight_class_id: Uuid,
    pub voting_type_config_id: Uuid,
    pub name: String,
    pub weight_multiplier: Decimal,
    pub requires_approval: bool,
}

/// Assignment of a weight class to a user for one event. Absence implies
/// the default 1.00 multiplier; so does an unapproved assignment when the
/// class requires approval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserVoterClass {
    pub user_voter_class_id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub weight_class_id: Uuid,
    pub approved_at: Option<DateTime<Utc>>,
}
