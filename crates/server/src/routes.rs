use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::errors::ServiceError;

use crate::errors::ApiError;
use crate::state::AppState;

pub mod blogs;
pub mod users;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    match service::metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// Run a store call on its own task. A client that disconnects drops the
/// handler future, but the mutation still completes or fails as a whole.
pub(crate) async fn to_completion<F, T>(fut: F) -> Result<T, ApiError>
where
    F: std::future::Future<Output = Result<T, ServiceError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(fut).await {
        Ok(res) => res.map_err(ApiError::from),
        Err(e) => Err(ApiError(ServiceError::unavailable(format!("store task failed: {e}")))),
    }
}

/// Build the full application router: blog and user APIs plus health/metrics.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api = Router::new()
        .route("/api/users", post(users::signup_or_login))
        .route("/api/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/api/blogs/:id", delete(blogs::delete_blog))
        .route("/api/blogs/:id/like", post(blogs::like_blog))
        .route("/api/blogs/:id/comment", post(blogs::comment_blog));

    ops.merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status and latency on completion
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
