pub mod docs;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::rate_limit::rate_limit_middleware;
use crate::screening::handlers as screening;
use crate::sentiment::handlers as sentiment;
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit =
        DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES);

    // Every business route shares the per-IP budget.
    let limited = Router::new()
        .route(
            "/screen-resume",
            post(screening::handle_screen_resume).layer(upload_limit),
        )
        .route(
            "/screen-resume-with-job",
            post(screening::handle_screen_resume_with_job).layer(upload_limit),
        )
        .route(
            "/get-job-positions",
            get(screening::handle_get_job_positions),
        )
        .route(
            "/test-sample-resume",
            get(screening::handle_test_sample_resume),
        )
        .route(
            "/analyze-sentiment",
            post(sentiment::handle_analyze_sentiment),
        )
        .route(
            "/analyze-sentiment-batch",
            post(sentiment::handle_analyze_sentiment_batch),
        )
        .route(
            "/test-sample-sentiment",
            get(sentiment::handle_test_sample_sentiment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/", get(docs::root_handler))
        .route("/health", get(health::health_handler))
        .route("/docs", get(docs::docs_handler))
        .route("/openapi.json", get(docs::openapi_handler))
        .merge(limited)
        .with_state(state)
}
