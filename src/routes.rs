// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{analytics, attempt, result},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Every `/api` route requires a bearer token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.cors_origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let test_routes = Router::new()
        .route("/{id}/start", post(attempt::start_test))
        .route("/{id}/save", post(attempt::save_progress))
        .route("/{id}/submit", post(attempt::submit_test));

    let attempt_routes = Router::new().route("/{id}/result", get(result::get_attempt_result));

    let analytics_routes = Router::new().route("/performance", get(analytics::get_performance));

    let api_routes = Router::new()
        .nest("/tests", test_routes)
        .nest("/attempts", attempt_routes)
        .nest("/analytics", analytics_routes)
        // route_layer keeps unknown paths a 404 instead of a 401
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// `*` opens CORS to any origin; otherwise only the listed ones are allowed.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.iter().any(|o| o == "*") {
        return AllowOrigin::any();
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    AllowOrigin::list(values)
}
