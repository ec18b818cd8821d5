use axum::{
    Json,
    extract::{Path, Query, State},
};
use storage::{
    Database,
    dto::results::{
        EventSummaryResponse, LeaderboardParams, LiveResultsResponse, RankedStanding,
        RebuildResponse,
    },
    repository::event::EventRepository,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::middleware::auth::AdminKey;

use super::services;

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    responses(
        (status = 200, description = "Full ranked results", body = Vec<RankedStanding>)
    ),
    tag = "results"
)]
pub async fn get_results(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<RankedStanding>>, WebError> {
    let results = services::ranked_results(db.pool(), event_id, None, None, None).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results/division/{division_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event"),
        ("division_id" = Uuid, Path, description = "Division to scope results to")
    ),
    responses(
        (status = 200, description = "Division-scoped ranked results", body = Vec<RankedStanding>)
    ),
    tag = "results"
)]
pub async fn get_division_results(
    State(db): State<Database>,
    Path((event_id, division_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<RankedStanding>>, WebError> {
    let results =
        services::ranked_results(db.pool(), event_id, Some(division_id), None, None).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results/leaderboard",
    params(
        ("event_id" = Uuid, Path, description = "Event"),
        LeaderboardParams
    ),
    responses(
        (status = 200, description = "Top-N standings", body = Vec<RankedStanding>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "results"
)]
pub async fn get_leaderboard(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<RankedStanding>>, WebError> {
    params.validate().map_err(WebError::BadRequest)?;

    let results = services::ranked_results(
        db.pool(),
        event_id,
        params.division_id,
        params.division_type.as_deref(),
        params.limit.or(Some(10)),
    )
    .await?;

    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results/summary",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    responses(
        (status = 200, description = "Aggregate counts for dashboards", body = EventSummaryResponse)
    ),
    tag = "results"
)]
pub async fn get_summary(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventSummaryResponse>, WebError> {
    let summary = services::event_summary(db.pool(), event_id).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/results/live",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    responses(
        (status = 200, description = "Polling view with cheap change detector", body = LiveResultsResponse),
        (status = 404, description = "Live results are not enabled for this event")
    ),
    tag = "results"
)]
pub async fn get_live_results(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<LiveResultsResponse>, WebError> {
    let enabled = EventRepository::new(db.pool())
        .module_enabled(event_id, "live_results")
        .await?;
    if !enabled {
        return Err(WebError::NotFound);
    }

    let live = services::live_results(db.pool(), event_id).await?;
    Ok(Json(live))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/results/rebuild",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Summaries re-derived from live votes", body = RebuildResponse),
        (status = 401, description = "Missing or invalid API key")
    ),
    tag = "results"
)]
pub async fn rebuild_summaries(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    _admin: AdminKey,
) -> Result<Json<RebuildResponse>, WebError> {
    let keys_rebuilt = services::rebuild_summaries(db.pool(), event_id).await?;

    Ok(Json(RebuildResponse {
        success: true,
        keys_rebuilt,
    }))
}
