use std::collections::BTreeMap;
use std::time::Duration;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

use crate::llm_client::TextModel;
use crate::state::AppState;

/// How long one provider health check answers for `/health`.
pub const PROVIDER_CHECK_TTL: Duration = Duration::from_secs(30);

/// Last provider health check and when it ran.
/// The lock is held across the upstream call, so concurrent `/health`
/// requests share one check instead of each calling Google.
pub struct ProviderHealthCache {
    ttl: Duration,
    last: Mutex<Option<(Instant, Result<(), String>)>>,
}

impl ProviderHealthCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            last: Mutex::new(None),
        }
    }

    pub async fn check(&self, model: &dyn TextModel) -> Result<(), String> {
        let mut last = self.last.lock().await;
        if let Some((checked_at, outcome)) = last.as_ref() {
            if checked_at.elapsed() < self.ttl {
                debug!("Reusing cached Google AI health result");
                return outcome.clone();
            }
        }

        let outcome = model.health_check().await.map_err(|e| {
            warn!(error = %e, "Google AI health check failed");
            e.to_string()
        });
        *last = Some((Instant::now(), outcome.clone()));
        outcome
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentStatus {
    fn healthy(detail: impl Into<String>) -> Self {
        Self {
            status: ComponentState::Healthy,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// `healthy` when every component is, `degraded` otherwise.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
    pub components: BTreeMap<&'static str, ComponentStatus>,
}

/// GET /health
/// Always 200. A failing provider check marks `google_ai` unhealthy and the
/// overall status `degraded`. The provider result is cached for
/// [`PROVIDER_CHECK_TTL`].
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    let google_ai = match state.provider_health.check(state.llm.as_ref()).await {
        Ok(()) => ComponentStatus::healthy(state.llm.model_name()),
        Err(detail) => ComponentStatus {
            status: ComponentState::Unhealthy,
            detail: Some(detail),
        },
    };

    let mut components = BTreeMap::new();
    components.insert(
        "resume_screener",
        ComponentStatus::healthy(format!(
            "{} positions loaded",
            state.catalog.total_positions()
        )),
    );
    components.insert("sentiment_analyzer", ComponentStatus::healthy("ready"));
    components.insert("google_ai", google_ai);

    let all_healthy = components
        .values()
        .all(|c| c.status == ComponentState::Healthy);

    Json(HealthStatus {
        status: if all_healthy { "healthy" } else { "degraded" },
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        components,
    })
}
