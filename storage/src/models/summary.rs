use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Denormalized aggregate of the live votes for one
/// (event, entry, division, category) key. A materialized view, not a
/// source of truth: always re-derivable from vote rows, and only ever
/// written by the summary aggregator. The cached `ranking` is refreshed in
/// the same pass as the totals and may be one aggregation cycle stale.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VoteSummary {
    pub vote_summary_id: Uuid,
    pub event_id: Uuid,
    pub entry_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub total_points: Decimal,
    pub vote_count: i32,
    pub first_place_count: i32,
    pub second_place_count: i32,
    pub third_place_count: i32,
    pub average_rating: Option<Decimal>,
    pub ranking: Option<i32>,
    pub computed_at: DateTime<Utc>,
}

/// Identity of one summary row. Division and category come from the entry,
/// so a key is stable across submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow)]
pub struct SummaryKey {
    pub event_id: Uuid,
    pub entry_id: Uuid,
    pub division_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

/// The slice of a live vote row the aggregator folds over.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct VoteFact {
    pub place: Option<i32>,
    pub rating: Option<Decimal>,
    pub final_points: Decimal,
}

/// Recomputed totals for one summary key. Replaces the stored row's values
/// wholesale; never incremented.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTotals {
    pub total_points: Decimal,
    pub vote_count: i32,
    pub first_place_count: i32,
    pub second_place_count: i32,
    pub third_place_count: i32,
    pub average_rating: Option<Decimal>,
}
