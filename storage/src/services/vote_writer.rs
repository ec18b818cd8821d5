use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::dto::ballot::Ballot;
use crate::error::{CastError, StorageError, VoteError};
use crate::models::{SummaryKey, VoteStatus};
use crate::repository::config::VotingConfigRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::vote::VoteRepository;

use super::config_resolver::{self, ResolvedVotingConfig};
use super::scoring::{self, ScoredBallot};
use super::validation::{self, BallotContext};
use super::aggregation;

/// Who is casting, plus the anonymous-ballot metadata captured from the
/// request.
#[derive(Debug, Clone)]
pub struct CastContext {
    pub user_id: Uuid,
    pub voter_ip: Option<String>,
    pub voter_fingerprint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CastOutcome {
    pub ballot_id: Uuid,
    pub votes_recorded: usize,
    pub superseded_prior: bool,
}

/// Validates, scores and persists a ballot as one atomic unit of work,
/// then eagerly refreshes the touched summaries. The one-live-ballot
/// invariant is re-checked inside the transaction under a per-(event,
/// user) lock, so a concurrent duplicate that slipped past validation
/// still fails with `AlreadyVoted`.
pub async fn cast_ballot(
    pool: &PgPool,
    event_id: Uuid,
    caster: &CastContext,
    votes: &serde_json::Value,
) -> Result<CastOutcome, CastError> {
    let (config, scored) = prepare_ballot(pool, event_id, caster.user_id, votes).await?;

    let mut tx = pool.begin().await.map_err(StorageError::from)?;

    // Serializes concurrent submissions from the same user for this event.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 42))")
        .bind(format!("{event_id}:{}", caster.user_id))
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

    let live_exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM votes
            WHERE event_id = $1 AND user_id = $2 AND status = 'live'
        )
        "#,
    )
    .bind(event_id)
    .bind(caster.user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(StorageError::from)?;

    let mut vacated: Vec<SummaryKey> = Vec::new();
    if live_exists {
        if !config.allow_vote_changes {
            return Err(CastError::Invalid(vec![VoteError::AlreadyVoted]));
        }
        vacated = sqlx::query_as::<_, SummaryKey>(
            r#"
            UPDATE votes
            SET status = 'superseded'
            WHERE event_id = $1 AND user_id = $2 AND status = 'live'
            RETURNING event_id, entry_id, division_id, category_id
            "#,
        )
        .bind(event_id)
        .bind(caster.user_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(StorageError::from)?;
    }

    let ballot_id = Uuid::new_v4();
    let mut insert = QueryBuilder::new(
        "INSERT INTO votes (ballot_id, event_id, user_id, entry_id, division_id, \
         category_id, place, rating, base_points, weight_multiplier, final_points, \
         status, voter_ip, voter_fingerprint) ",
    );
    insert.push_values(scored.selections.iter(), |mut row, s| {
        row.push_bind(ballot_id)
            .push_bind(event_id)
            .push_bind(caster.user_id)
            .push_bind(s.selection.entry_id)
            .push_bind(s.selection.division_id)
            .push_bind(s.selection.category_id)
            .push_bind(s.selection.place)
            .push_bind(s.selection.rating)
            .push_bind(s.base_points)
            .push_bind(scored.weight_multiplier)
            .push_bind(s.final_points)
            .push_bind(VoteStatus::Live)
            .push_bind(caster.voter_ip.as_deref())
            .push_bind(caster.voter_fingerprint.as_deref());
    });
    insert
        .build()
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

    tx.commit().await.map_err(StorageError::from)?;

    let superseded_prior = !vacated.is_empty();
    let mut touched: Vec<SummaryKey> = scored
        .selections
        .iter()
        .map(|s| SummaryKey {
            event_id,
            entry_id: s.selection.entry_id,
            division_id: s.selection.division_id,
            category_id: s.selection.category_id,
        })
        .collect();
    touched.extend(vacated);

    // The committed votes are the source of truth; a failed refresh only
    // leaves the disposable summaries stale, so it is retried with backoff
    // and never fails the cast.
    refresh_with_backoff(pool, event_id, &touched).await;

    Ok(CastOutcome {
        ballot_id,
        votes_recorded: scored.selections.len(),
        superseded_prior,
    })
}

/// Recomputation is idempotent over committed rows, so retrying after any
/// failure is safe.
async fn refresh_with_backoff(pool: &PgPool, event_id: Uuid, keys: &[SummaryKey]) {
    let mut delay = std::time::Duration::from_millis(50);

    for attempt in 1..=3 {
        match aggregation::refresh_keys_and_rank(pool, event_id, keys).await {
            Ok(()) => return,
            Err(error) if attempt < 3 => {
                tracing::warn!(%event_id, %error, attempt, "summary refresh failed, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(error) => {
                tracing::warn!(%event_id, %error, "summary refresh failed; summaries are stale");
            }
        }
    }
}

/// Dry-run validation of a ballot: resolves, parses, validates and scores
/// exactly like `cast_ballot`, but persists nothing.
pub async fn check_ballot(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    votes: &serde_json::Value,
) -> Result<(), CastError> {
    prepare_ballot(pool, event_id, user_id, votes).await?;
    Ok(())
}

async fn prepare_ballot(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    votes: &serde_json::Value,
) -> Result<(ResolvedVotingConfig, ScoredBallot), CastError> {
    let config = config_resolver::resolve(pool, event_id).await?;

    let ballot = Ballot::from_wire(config.category, votes)
        .map_err(|error| CastError::Invalid(vec![error]))?;

    let entries = EntryRepository::new(pool)
        .list_refs(event_id)
        .await
        .map_err(CastError::from)?
        .into_iter()
        .map(|entry| (entry.entry_id, entry))
        .collect();

    let has_live_ballot = VoteRepository::new(pool)
        .has_live_ballot(event_id, user_id)
        .await
        .map_err(CastError::from)?;

    let ctx = BallotContext {
        config,
        entries,
        caster_user_id: user_id,
        has_live_ballot,
        now: chrono::Utc::now(),
    };

    let normalized = validation::validate_ballot(&ctx, &ballot).map_err(CastError::Invalid)?;

    let weight_multiplier = VotingConfigRepository::new(pool)
        .user_weight_multiplier(event_id, user_id)
        .await
        .map_err(CastError::from)?;

    let scored = scoring::score_ballot(&ctx.config, &normalized, weight_multiplier)
        .map_err(CastError::Invalid)?;

    Ok((ctx.config, scored))
}
