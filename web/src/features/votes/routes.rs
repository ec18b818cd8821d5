use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::handlers::{cast_vote, has_voted, my_votes, remove_vote, validate_vote};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cast_vote))
        .route("/validate", post(validate_vote))
        .route("/mine", get(my_votes))
        .route("/has-voted", get(has_voted))
        .route("/:vote_id", delete(remove_vote))
}
