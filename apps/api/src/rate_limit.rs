//! Per-client-IP request limiting.
//!
//! Sliding-window log: a client may make at most `limit` requests in any
//! trailing `window`. Each IP keeps the timestamps of its admitted requests;
//! the DashMap entry guard serializes prune, check and append for one key.
//!
//! Clients are keyed on the socket peer. `X-Forwarded-For` is only read when
//! the service is configured to sit behind a trusted proxy.

use std::{collections::VecDeque, net::IpAddr, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::time::Instant;

use crate::errors::AppError;

pub const WINDOW: Duration = Duration::from_secs(60);

pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    hits: DashMap<IpAddr, VecDeque<Instant>>,
    trust_forwarded_for: bool,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit.max(1) as usize,
            window,
            hits: DashMap::new(),
            trust_forwarded_for: false,
        }
    }

    /// Keys clients on the first `X-Forwarded-For` hop when set.
    pub fn trusting_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn per_minute(limit: u32, trust_forwarded_for: bool) -> Arc<Self> {
        Arc::new(Self::new(limit, WINDOW).trusting_forwarded_for(trust_forwarded_for))
    }

    /// Admits the request, or returns how long until the oldest logged
    /// request leaves the window.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), Duration> {
        let mut entry = self.hits.entry(client).or_default();
        let log = entry.value_mut();

        while let Some(&oldest) = log.front() {
            if now.duration_since(oldest) >= self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= self.limit {
            let oldest = log.front().copied().unwrap_or(now);
            return Err(self.window.saturating_sub(now.duration_since(oldest)));
        }

        log.push_back(now);
        Ok(())
    }

    /// Drops clients with no request inside the window.
    pub fn retain_recent(&self) {
        let now = Instant::now();
        self.hits.retain(|_, log| {
            log.back()
                .is_some_and(|&last| now.duration_since(last) < self.window)
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.hits.len()
    }
}

/// Prunes idle clients once per window for the life of the process.
pub fn spawn_pruner(limiter: Arc<SlidingWindowLimiter>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(limiter.window);
        loop {
            ticker.tick().await;
            limiter.retain_recent();
            tracing::debug!(clients = limiter.tracked_clients(), "Rate limiter pruned");
        }
    });
}

/// Resolves the caller IP from the socket peer. The first `X-Forwarded-For`
/// hop wins only when the proxy in front is trusted to set it.
pub fn client_ip(request: &Request, trust_forwarded_for: bool) -> Option<IpAddr> {
    let forwarded = trust_forwarded_for
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Middleware enforcing the per-IP budget on the routes it wraps.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(ip) = client_ip(&request, limiter.trust_forwarded_for) else {
        tracing::warn!("Could not determine client IP for rate limiting");
        return Ok(next.run(request).await);
    };

    match limiter.check(ip) {
        Ok(()) => Ok(next.run(request).await),
        Err(wait) => {
            let retry_after = ceil_secs(wait);
            tracing::warn!(client = %ip, path = %request.uri().path(), retry_after, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after })
        }
    }
}

fn ceil_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
