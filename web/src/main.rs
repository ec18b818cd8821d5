use anyhow::Context;
use axum::Router;
use storage::Database;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::Config;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::votes::handlers::cast_vote,
        features::votes::handlers::validate_vote,
        features::votes::handlers::my_votes,
        features::votes::handlers::has_voted,
        features::votes::handlers::remove_vote,
        features::results::handlers::get_results,
        features::results::handlers::get_division_results,
        features::results::handlers::get_leaderboard,
        features::results::handlers::get_summary,
        features::results::handlers::get_live_results,
        features::results::handlers::rebuild_summaries,
    ),
    components(
        schemas(
            storage::dto::vote::CastVoteRequest,
            storage::dto::vote::CastVoteResponse,
            storage::dto::vote::ValidateVoteResponse,
            storage::dto::vote::HasVotedResponse,
            storage::dto::vote::RemoveVoteRequest,
            storage::dto::vote::MyVoteRow,
            storage::dto::results::StandingRow,
            storage::dto::results::RankedStanding,
            storage::dto::results::EventSummaryResponse,
            storage::dto::results::LiveResultsResponse,
            storage::dto::results::RebuildResponse,
            storage::models::Event,
            storage::models::EventModule,
            storage::models::Division,
            storage::models::Category,
            storage::models::Participant,
            storage::models::Entry,
            storage::models::VotingTypeConfig,
            storage::models::VotingCategory,
            storage::models::PlaceConfig,
            storage::models::EventVotingConfig,
            storage::models::PlaceOverride,
            storage::models::VoterWeightClass,
            storage::models::UserVoterClass,
            storage::models::Vote,
            storage::models::VoteStatus,
            storage::models::VoteSummary,
        )
    ),
    tags(
        (name = "votes", description = "Ballot submission endpoints"),
        (name = "results", description = "Leaderboard and live-results endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Event Voting API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        api_keys: ApiKeys::from_comma_separated(&config.api_keys),
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let app = Router::new()
        .nest("/api/events/:event_id/votes", features::votes::routes::routes())
        .nest(
            "/api/events/:event_id/results",
            features::results::routes::routes(),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .context("Failed to bind server address")?;
    axum::serve(listener, app).await?;

    Ok(())
}
