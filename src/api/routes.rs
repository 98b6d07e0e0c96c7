use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{request_id_middleware, span_for_request};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        // Users
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::create_user))
        // Movies
        .route("/movies", get(handlers::list_movies))
        .route("/movies", post(handlers::create_movie))
        // Watch history
        .route(
            "/users/:user_id/watch/:movie_id",
            post(handlers::record_watch),
        )
        // Recommendations
        .route(
            "/users/:user_id/recommendations",
            get(handlers::recommendations),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(span_for_request)),
        )
        .with_state(state)
}
