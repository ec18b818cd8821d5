use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Wire payload for casting (or dry-run validating) a ballot. The shape of
/// `votes` depends on the event's voting category; `Ballot::from_wire`
/// interprets it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CastVoteRequest {
    #[schema(value_type = Object)]
    pub votes: serde_json::Value,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CastVoteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateVoteResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HasVotedResponse {
    pub has_voted: bool,
}

/// Request payload for an audited vote removal.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RemoveVoteRequest {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Reason must be between 1 and 500 characters"
    ))]
    pub reason: String,
}

/// One live ballot row as shown back to its caster.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MyVoteRow {
    pub vote_id: Uuid,
    pub ballot_id: Uuid,
    pub entry_id: Uuid,
    pub entry_number: i32,
    pub entry_title: String,
    pub place: Option<i32>,
    pub rating: Option<Decimal>,
    pub base_points: Decimal,
    pub weight_multiplier: Decimal,
    pub final_points: Decimal,
    pub created_at: DateTime<Utc>,
}
