use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextModel;
use crate::rate_limit::SlidingWindowLimiter;
use crate::routes::health::{ProviderHealthCache, PROVIDER_CHECK_TTL};
use crate::screening::requirements::JobCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Gemini in production; a scripted model in tests.
    pub llm: Arc<dyn TextModel>,
    pub config: Config,
    pub limiter: Arc<SlidingWindowLimiter>,
    pub catalog: Arc<JobCatalog>,
    pub provider_health: Arc<ProviderHealthCache>,
}

impl AppState {
    pub fn new(llm: Arc<dyn TextModel>, config: Config) -> Self {
        let limiter = SlidingWindowLimiter::per_minute(
            config.rate_limit_per_minute,
            config.trust_forwarded_for,
        );
        Self {
            llm,
            config,
            limiter,
            catalog: Arc::new(JobCatalog::builtin()),
            provider_health: Arc::new(ProviderHealthCache::new(PROVIDER_CHECK_TTL)),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        google_ai_api_key: "test-key".to_string(),
        model_name: crate::config::DEFAULT_MODEL_NAME.to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        rate_limit_per_minute: 5,
        max_upload_bytes: crate::config::DEFAULT_MAX_UPLOAD_BYTES,
        sample_resume_path: "data/resumes/john_smith_resume.txt".to_string(),
        trust_forwarded_for: false,
    }
}
