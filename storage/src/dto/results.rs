use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Unranked standing for one summary key, as read from the store. Ordering
/// and rank assignment happen in `services::ranking`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StandingRow {
    pub entry_id: Uuid,
    pub entry_number: i32,
    pub title: String,
    pub division_id: Option<Uuid>,
    pub division_name: Option<String>,
    pub division_type: Option<String>,
    pub category_id: Option<Uuid>,
    pub total_points: Decimal,
    pub vote_count: i32,
    pub first_place_count: i32,
    pub second_place_count: i32,
    pub third_place_count: i32,
    pub average_rating: Option<Decimal>,
}

/// A standing with its position in the requested view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedStanding {
    pub rank: i32,
    #[serde(flatten)]
    pub standing: StandingRow,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
    pub division_id: Option<Uuid>,
    pub division_type: Option<String>,
}

impl LeaderboardParams {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(limit) = self.limit
            && !(1..=100).contains(&limit)
        {
            return Err("limit must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

/// Aggregate counts for dashboard display.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct EventSummaryResponse {
    pub total_votes: i64,
    pub total_entries: i64,
    pub total_participants: i64,
    pub total_divisions: i64,
}

/// Polling view. Clients compare `vote_count` to their last-seen value
/// before re-rendering the full list.
#[derive(Debug, Serialize, ToSchema)]
pub struct LiveResultsResponse {
    pub vote_count: i64,
    pub results: Vec<RankedStanding>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RebuildResponse {
    pub success: bool,
    pub keys_rebuilt: u64,
}
