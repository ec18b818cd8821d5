use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{PlaceConfig, PlaceOverride, VoterWeightClass, VotingCategory};

/// The event's active voting configuration joined with its voting type.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveConfigRow {
    pub event_voting_config_id: Uuid,
    pub voting_type_config_id: Uuid,
    pub category: VotingCategory,
    pub max_votes_per_user: Option<i32>,
    pub max_votes_per_entry: Option<i32>,
    pub allow_self_voting: bool,
    pub voting_starts_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
    pub max_selections: Option<i32>,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
    pub points_per_selection: Option<Decimal>,
    pub max_points_per_ballot: Option<Decimal>,
}

pub struct VotingConfigRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VotingConfigRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active(&self, event_id: Uuid) -> Result<Option<ActiveConfigRow>> {
        let row = sqlx::query_as::<_, ActiveConfigRow>(
            r#"
            SELECT evc.event_voting_config_id, evc.voting_type_config_id,
                   vtc.category, evc.max_votes_per_user, evc.max_votes_per_entry,
                   evc.allow_self_voting, evc.voting_starts_at, evc.voting_ends_at,
                   vtc.max_selections, vtc.min_rating, vtc.max_rating,
                   vtc.points_per_selection, vtc.max_points_per_ballot
            FROM event_voting_configs evc
            INNER JOIN voting_type_configs vtc
                ON evc.voting_type_config_id = vtc.voting_type_config_id
            WHERE evc.event_id = $1 AND evc.is_active
            "#,
        )
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_places(&self, voting_type_config_id: Uuid) -> Result<Vec<PlaceConfig>> {
        let places = sqlx::query_as::<_, PlaceConfig>(
            r#"
            SELECT place_config_id, voting_type_config_id, place, points
            FROM place_configs
            WHERE voting_type_config_id = $1
            ORDER BY place
            "#,
        )
        .bind(voting_type_config_id)
        .fetch_all(self.pool)
        .await?;

        Ok(places)
    }

    pub async fn list_overrides(&self, event_voting_config_id: Uuid) -> Result<Vec<PlaceOverride>> {
        let overrides = sqlx::query_as::<_, PlaceOverride>(
            r#"
            SELECT place_override_id, event_voting_config_id, place, points
            FROM place_overrides
            WHERE event_voting_config_id = $1
            ORDER BY place
            "#,
        )
        .bind(event_voting_config_id)
        .fetch_all(self.pool)
        .await?;

        Ok(overrides)
    }

    pub async fn list_weight_classes(&self, voting_type_config_id: Uuid) -> Result<Vec<VoterWeightClass>> {
        let classes = sqlx::query_as::<_, VoterWeightClass>(
            r#"
            SELECT weight_class_id, voting_type_config_id, name,
                   weight_multiplier, requires_approval
            FROM voter_weight_classes
            WHERE voting_type_config_id = $1
            ORDER BY name
            "#,
        )
        .bind(voting_type_config_id)
        .fetch_all(self.pool)
        .await?;

        Ok(classes)
    }

    /// The caster's effective weight multiplier for an event. No assignment,
    /// or an unapproved assignment to a class that requires approval,
    /// resolves to 1.00.
    pub async fn user_weight_multiplier(&self, event_id: Uuid, user_id: Uuid) -> Result<Decimal> {
        let multiplier = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT wc.weight_multiplier
            FROM user_voter_classes uvc
            INNER JOIN voter_weight_classes wc ON uvc.weight_class_id = wc.weight_class_id
            WHERE uvc.event_id = $1
              AND uvc.user_id = $2
              AND (NOT wc.requires_approval OR uvc.approved_at IS NOT NULL)
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(multiplier.unwrap_or(Decimal::ONE))
    }
}
