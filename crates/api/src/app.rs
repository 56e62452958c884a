use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::trace_id;
use crate::routes::{health, locations, statistics, vehicle_cases};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Org-scoped routes; membership is checked per handler so a non-member
    // sees the same 404 as a missing resource.
    let org_routes = Router::new()
        .route(
            "/api/v1/orgs/:org_id/cases",
            get(vehicle_cases::list_cases).post(vehicle_cases::create_case),
        )
        .route(
            "/api/v1/orgs/:org_id/cases/:case_id",
            get(vehicle_cases::get_case)
                .patch(vehicle_cases::update_case)
                .delete(vehicle_cases::delete_case),
        )
        .route(
            "/api/v1/orgs/:org_id/cases/:case_id/klar",
            post(vehicle_cases::mark_case_klar),
        )
        .route(
            "/api/v1/orgs/:org_id/cases/:case_id/restore",
            post(vehicle_cases::restore_case),
        )
        .route(
            "/api/v1/orgs/:org_id/cases/:case_id/audits",
            get(vehicle_cases::list_case_audits),
        )
        .route(
            "/api/v1/orgs/:org_id/statistics",
            get(statistics::org_statistics),
        )
        .route(
            "/api/v1/orgs/:org_id/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/api/v1/orgs/:org_id/locations/:location_id",
            patch(locations::rename_location).delete(locations::delete_location),
        )
        .route(
            "/api/v1/orgs/:org_id/locations/:location_id/default",
            post(locations::set_default_location),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live));

    Router::new()
        .merge(public_routes)
        .merge(org_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
