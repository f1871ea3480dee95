//! # api-adapters
//!
//! The HTTP surface of the engine. Handlers translate requests into service
//! calls and domain errors into status codes; no business rules live here.

pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use services::aggregate::AggregatorService;
use services::lifecycle::LifecycleService;
use services::matching::MatchingService;
use services::redemption::RedemptionService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub matching: Arc<MatchingService>,
    pub lifecycle: Arc<LifecycleService>,
    pub aggregator: Arc<AggregatorService>,
    pub redemption: Arc<RedemptionService>,
}

/// Builds the full API router. Mounted at the root; the binary may nest it
/// under a prefix if deployments need one.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/reports",
            post(handlers::submit_report).get(handlers::list_reports),
        )
        .route("/reports/{id}", axum::routing::delete(handlers::delete_report))
        .route(
            "/tasks",
            get(handlers::list_worker_tasks).post(handlers::create_adhoc_task),
        )
        .route("/tasks/available", get(handlers::list_available))
        .route("/tasks/{id}/claim", post(handlers::claim_task))
        .route("/tasks/{id}/start", post(handlers::start_task))
        .route("/tasks/{id}/complete", post(handlers::complete_task))
        .route("/leaderboard", get(handlers::leaderboard))
        .route("/users/{id}/stats", get(handlers::user_stats))
        .route("/users/{id}/badges", get(handlers::user_badges))
        .route("/users/{id}/level", get(handlers::user_level))
        .route("/users/{id}/perks", get(handlers::user_perks))
        .route(
            "/users/{id}/redemptions",
            get(handlers::user_redemptions).post(handlers::redeem_perk),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_policy())
        .with_state(state)
}

/// CORS for deployments where the UI lives on another origin.
fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}
