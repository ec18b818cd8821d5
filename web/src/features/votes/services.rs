use sqlx::PgPool;
use storage::{
    dto::vote::MyVoteRow,
    error::CastError,
    repository::{event::EventRepository, vote::VoteRepository},
    services::{aggregation, vote_writer},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::middleware::auth::ClientMeta;

/// Casts a ballot for the authenticated user. Rejected outright when the
/// event's voting module is switched off.
pub async fn cast_vote(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    meta: &ClientMeta,
    votes: &serde_json::Value,
) -> Result<vote_writer::CastOutcome, WebError> {
    ensure_voting_enabled(pool, event_id).await?;

    let caster = vote_writer::CastContext {
        user_id,
        voter_ip: meta.ip.clone(),
        voter_fingerprint: meta.fingerprint.clone(),
    };

    let outcome = vote_writer::cast_ballot(pool, event_id, &caster, votes).await?;

    tracing::info!(
        %event_id,
        ballot_id = %outcome.ballot_id,
        votes = outcome.votes_recorded,
        superseded = outcome.superseded_prior,
        "ballot recorded"
    );

    Ok(outcome)
}

/// Dry-run validation. Returns the collected violation messages instead of
/// failing the request, so the client can render them inline.
pub async fn validate_vote(
    pool: &PgPool,
    event_id: Uuid,
    user_id: Uuid,
    votes: &serde_json::Value,
) -> WebResult<Vec<String>> {
    ensure_voting_enabled(pool, event_id).await?;

    match vote_writer::check_ballot(pool, event_id, user_id, votes).await {
        Ok(()) => Ok(Vec::new()),
        Err(CastError::Invalid(errors)) => {
            Ok(errors.iter().map(|e| e.to_string()).collect())
        }
        Err(CastError::Config(error)) => Ok(vec![error.to_string()]),
        Err(CastError::Storage(error)) => Err(error.into()),
    }
}

/// The caller's live ballot rows (empty if none).
pub async fn my_votes(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> WebResult<Vec<MyVoteRow>> {
    let rows = VoteRepository::new(pool)
        .live_ballot_rows(event_id, user_id)
        .await?;
    Ok(rows)
}

pub async fn has_voted(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> WebResult<bool> {
    let has_voted = VoteRepository::new(pool)
        .has_live_ballot(event_id, user_id)
        .await?;
    Ok(has_voted)
}

/// Tombstones one live vote with an audit reason and refreshes the vacated
/// summary key.
pub async fn remove_vote(
    pool: &PgPool,
    event_id: Uuid,
    vote_id: Uuid,
    reason: &str,
    removed_by: Uuid,
) -> WebResult<()> {
    let vacated = VoteRepository::new(pool)
        .remove_vote(event_id, vote_id, reason, removed_by)
        .await?;

    if let Err(error) = aggregation::refresh_keys_and_rank(pool, event_id, &[vacated]).await {
        tracing::warn!(%event_id, %error, "summary refresh after removal failed; summaries are stale");
    }

    Ok(())
}

async fn ensure_voting_enabled(pool: &PgPool, event_id: Uuid) -> WebResult<()> {
    let enabled = EventRepository::new(pool)
        .module_enabled(event_id, "voting")
        .await?;
    if enabled {
        Ok(())
    } else {
        Err(WebError::NotFound)
    }
}
