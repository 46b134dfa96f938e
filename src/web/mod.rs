pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

pub fn create_router(state: AppState) -> Router {
    let comment_api = Router::new()
        .route("/analyze", post(routes::analyze))
        .route("/summary", post(routes::summary))
        .route("/detailed", post(routes::detailed))
        .route("/sample", get(routes::sample))
        .route("/health", get(routes::health));

    Router::new()
        .nest("/api/comment", comment_api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
