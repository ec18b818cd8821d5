use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Scoring scheme family a voting type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "voting_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VotingCategory {
    Ranked,
    Approval,
    Weighted,
    Rating,
    Cumulative,
}

/// Immutable-per-version description of a scoring scheme. Category-specific
/// bounds live here; per-event knobs live on `EventVotingConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VotingTypeConfig {
    pub voting_type_config_id: Uuid,
    pub name: String,
    pub category: VotingCategory,
    pub max_selections: Option<i32>,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
    pub points_per_selection: Option<Decimal>,
    pub max_points_per_ballot: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlaceConfig {
    pub place_config_id: Uuid,
    pub voting_type_config_id: Uuid,
    pub place: i32,
    pub points: Decimal,
}

/// Per-event instantiation of a voting type, with event overrides.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventVotingConfig {
    pub event_voting_config_id: Uuid,
    pub event_id: Uuid,
    pub voting_type_config_id: Uuid,
    pub max_votes_per_user: Option<i32>,
    pub max_votes_per_entry: Option<i32>,
    pub allow_self_voting: bool,
    pub voting_starts_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Event-specific point override layered on top of the base place config.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PlaceOverride {
    pub place_override_id: Uuid,
    pub event_voting_config_id: Uuid,
    pub place: i32,
    pub points: Decimal,
}
