use sqlx::PgPool;
use storage::{
    dto::results::{EventSummaryResponse, LiveResultsResponse, RankedStanding},
    error::Result,
    repository::summary::SummaryRepository,
    services::{aggregation, ranking},
};
use uuid::Uuid;

/// Ranked standings for an event, optionally scoped to a division or a
/// division type. Ordering and rank assignment use the leaderboard's total
/// order, so repeated calls over the same summaries give the same list.
pub async fn ranked_results(
    pool: &PgPool,
    event_id: Uuid,
    division_id: Option<Uuid>,
    division_type: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<RankedStanding>> {
    let repo = SummaryRepository::new(pool);
    let rows = repo
        .fetch_standings(event_id, division_id, division_type, limit)
        .await?;
    Ok(ranking::rank_standings(rows))
}

pub async fn event_summary(pool: &PgPool, event_id: Uuid) -> Result<EventSummaryResponse> {
    let repo = SummaryRepository::new(pool);
    repo.event_summary(event_id).await
}

/// Polling view: the event-wide live vote count alongside the full ranked
/// list. Clients compare `vote_count` first to detect "nothing changed".
pub async fn live_results(pool: &PgPool, event_id: Uuid) -> Result<LiveResultsResponse> {
    let repo = SummaryRepository::new(pool);
    let vote_count = repo.live_vote_count(event_id).await?;
    let rows = repo.fetch_standings(event_id, None, None, None).await?;

    Ok(LiveResultsResponse {
        vote_count,
        results: ranking::rank_standings(rows),
    })
}

/// From-scratch rebuild of every summary row of the event.
pub async fn rebuild_summaries(pool: &PgPool, event_id: Uuid) -> Result<u64> {
    aggregation::rebuild_event(pool, event_id).await
}
