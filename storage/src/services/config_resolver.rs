use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ConfigError;
use crate::models::{PlaceConfig, PlaceOverride, VoterWeightClass, VotingCategory};
use crate::repository::config::VotingConfigRepository;
use crate::repository::event::EventRepository;

/// Where an event sits in its voting lifecycle. Implicit in the window
/// fields; only `Open` accepts ballots, `Closed` still serves results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    NotStarted,
    Open,
    Closed,
}

/// The fully resolved voting rules for one event: category, effective
/// place table (base points with event overrides applied), limits, window
/// and weight classes. Pure data; resolving it has no side effects.
#[derive(Debug, Clone)]
pub struct ResolvedVotingConfig {
    pub event_id: Uuid,
    pub category: VotingCategory,
    pub places: BTreeMap<i32, Decimal>,
    pub max_votes_per_user: Option<i32>,
    pub max_votes_per_entry: Option<i32>,
    pub allow_self_voting: bool,
    pub allow_vote_changes: bool,
    pub voting_starts_at: Option<DateTime<Utc>>,
    pub voting_ends_at: Option<DateTime<Utc>>,
    pub event_is_active: bool,
    pub min_rating: Option<Decimal>,
    pub max_rating: Option<Decimal>,
    pub max_selections: Option<i32>,
    pub points_per_selection: Decimal,
    pub max_points_per_ballot: Option<Decimal>,
    pub weight_classes: Vec<VoterWeightClass>,
}

impl ResolvedVotingConfig {
    pub fn window_state(&self, now: DateTime<Utc>) -> WindowState {
        if let Some(starts_at) = self.voting_starts_at
            && now < starts_at
        {
            return WindowState::NotStarted;
        }
        if let Some(ends_at) = self.voting_ends_at
            && now > ends_at
        {
            return WindowState::Closed;
        }
        WindowState::Open
    }

    pub fn accepts_ballots(&self, now: DateTime<Utc>) -> bool {
        self.event_is_active && self.window_state(now) == WindowState::Open
    }
}

/// Layers event-level point overrides over the base place table. Rejects
/// a base table whose places are not contiguous from 1 and overrides that
/// name a place the base table does not have.
pub fn merge_places(
    base: &[PlaceConfig],
    overrides: &[PlaceOverride],
) -> Result<BTreeMap<i32, Decimal>, ConfigError> {
    let mut places: BTreeMap<i32, Decimal> =
        base.iter().map(|p| (p.place, p.points)).collect();

    for (index, place) in places.keys().enumerate() {
        if *place != index as i32 + 1 {
            return Err(ConfigError::NonContiguousPlaces);
        }
    }

    for override_row in overrides {
        if !places.contains_key(&override_row.place) {
            return Err(ConfigError::UnknownOverridePlace {
                place: override_row.place,
            });
        }
        places.insert(override_row.place, override_row.points);
    }

    Ok(places)
}

/// Resolves the active voting rules for an event. Pure read; fails with a
/// `ConfigError` when the event has no active configuration or the place
/// setup is inconsistent.
pub async fn resolve(pool: &PgPool, event_id: Uuid) -> Result<ResolvedVotingConfig, ConfigError> {
    let event = EventRepository::new(pool).find_by_id(event_id).await?;

    let repo = VotingConfigRepository::new(pool);
    let active = repo
        .find_active(event_id)
        .await?
        .ok_or(ConfigError::MissingConfig)?;

    let base = repo.list_places(active.voting_type_config_id).await?;
    let overrides = repo.list_overrides(active.event_voting_config_id).await?;
    let places = merge_places(&base, &overrides)?;
    let weight_classes = repo.list_weight_classes(active.voting_type_config_id).await?;

    Ok(ResolvedVotingConfig {
        event_id,
        category: active.category,
        places,
        max_votes_per_user: active.max_votes_per_user,
        max_votes_per_entry: active.max_votes_per_entry,
        allow_self_voting: active.allow_self_voting,
        allow_vote_changes: event.allow_vote_changes,
        voting_starts_at: active.voting_starts_at,
        voting_ends_at: active.voting_ends_at,
        event_is_active: event.is_active,
        min_rating: active.min_rating,
        max_rating: active.max_rating,
        max_selections: active.max_selections,
        points_per_selection: active.points_per_selection.unwrap_or(Decimal::ONE),
        max_points_per_ballot: active.max_points_per_ballot,
        weight_classes,
    })
}
