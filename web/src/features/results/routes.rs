use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::handlers::{
    get_division_results, get_leaderboard, get_live_results, get_results, get_summary,
    rebuild_summaries,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_results))
        .route("/division/:division_id", get(get_division_results))
        .route("/leaderboard", get(get_leaderboard))
        .route("/summary", get(get_summary))
        .route("/live", get(get_live_results))
        .route("/rebuild", post(rebuild_summaries))
}
