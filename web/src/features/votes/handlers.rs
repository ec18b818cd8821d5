use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::vote::{
        CastVoteRequest, CastVoteResponse, HasVotedResponse, MyVoteRow, RemoveVoteRequest,
        ValidateVoteResponse,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::{AdminKey, AuthUser, ClientMeta};

use super::services;

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/votes",
    params(
        ("event_id" = Uuid, Path, description = "Event to vote in")
    ),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Ballot recorded", body = CastVoteResponse),
        (status = 401, description = "No authenticated user"),
        (status = 422, description = "Ballot rejected; violations grouped by field")
    ),
    tag = "votes"
)]
pub async fn cast_vote(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    user: AuthUser,
    meta: ClientMeta,
    Json(req): Json<CastVoteRequest>,
) -> Result<Json<CastVoteResponse>, WebError> {
    let outcome = services::cast_vote(db.pool(), event_id, user.0, &meta, &req.votes).await?;

    let message = if outcome.superseded_prior {
        "Your previous ballot was replaced".to_string()
    } else {
        "Your vote has been recorded".to_string()
    };

    Ok(Json(CastVoteResponse {
        success: true,
        message,
    }))
}

#[utoipa::path(
    post,
    path = "/api/events/{event_id}/votes/validate",
    params(
        ("event_id" = Uuid, Path, description = "Event to vote in")
    ),
    request_body = CastVoteRequest,
    responses(
        (status = 200, description = "Dry-run outcome; nothing persisted", body = ValidateVoteResponse)
    ),
    tag = "votes"
)]
pub async fn validate_vote(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    user: AuthUser,
    Json(req): Json<CastVoteRequest>,
) -> Result<Json<ValidateVoteResponse>, WebError> {
    let errors = services::validate_vote(db.pool(), event_id, user.0, &req.votes).await?;

    Ok(Json(ValidateVoteResponse {
        valid: errors.is_empty(),
        errors,
    }))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/votes/mine",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    responses(
        (status = 200, description = "The caller's live ballot rows, empty if none", body = Vec<MyVoteRow>)
    ),
    tag = "votes"
)]
pub async fn my_votes(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<Vec<MyVoteRow>>, WebError> {
    let rows = services::my_votes(db.pool(), event_id, user.0).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/votes/has-voted",
    params(
        ("event_id" = Uuid, Path, description = "Event")
    ),
    responses(
        (status = 200, description = "Whether the caller has a live ballot", body = HasVotedResponse)
    ),
    tag = "votes"
)]
pub async fn has_voted(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<HasVotedResponse>, WebError> {
    let has_voted = services::has_voted(db.pool(), event_id, user.0).await?;
    Ok(Json(HasVotedResponse { has_voted }))
}

#[utoipa::path(
    delete,
    path = "/api/events/{event_id}/votes/{vote_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event"),
        ("vote_id" = Uuid, Path, description = "Live vote to remove")
    ),
    request_body = RemoveVoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Vote removed with audit trail", body = CastVoteResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "No live vote with this id")
    ),
    tag = "votes"
)]
pub async fn remove_vote(
    State(db): State<Database>,
    Path((event_id, vote_id)): Path<(Uuid, Uuid)>,
    _admin: AdminKey,
    actor: AuthUser,
    Json(req): Json<RemoveVoteRequest>,
) -> Result<Json<CastVoteResponse>, WebError> {
    req.validate()?;

    services::remove_vote(db.pool(), event_id, vote_id, &req.reason, actor.0).await?;

    Ok(Json(CastVoteResponse {
        success: true,
        message: "Vote removed".to_string(),
    }))
}
