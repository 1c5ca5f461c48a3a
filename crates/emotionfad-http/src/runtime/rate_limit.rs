//! # Rate Limiting
//!
//! Global and per-IP request quotas applied as middleware in front of the
//! analysis routes.

use crate::runtime::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed, keyed::DefaultKeyedStateStore},
};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{debug, warn};

/// Checks between sweeps of idle per-IP entries
pub const PRUNE_EVERY: u64 = 1024;

/// Rate limiter for global requests
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter for per-IP requests
pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per minute globally
    pub global_rpm: u32,
    /// Maximum requests per minute per IP
    pub per_ip_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_rpm: 1000, // 1000 requests per minute globally
            per_ip_rpm: 120,  // 120 requests per minute per IP
        }
    }
}

/// Which quota rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    Global,
    Ip,
}

impl LimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Ip => "ip",
        }
    }

    /// Human-readable quota name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Ip => "Per-IP",
        }
    }
}

/// Rate limiting state
pub struct RateLimitState {
    global_limiter: GlobalRateLimiter,
    ip_limiter: IpRateLimiter,
    config: RateLimitConfig,
    checks: AtomicU64,
}

impl std::fmt::Debug for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitState")
            .field("config", &self.config)
            .field("tracked_ips", &self.tracked_ips())
            .finish()
    }
}

impl RateLimitState {
    /// Create rate limit state
    ///
    /// Returns None if any rate limit value is 0.
    pub fn try_new(config: RateLimitConfig) -> Option<Self> {
        let global_quota = Quota::per_minute(NonZeroU32::new(config.global_rpm)?);
        let ip_quota = Quota::per_minute(NonZeroU32::new(config.per_ip_rpm)?);

        Some(Self {
            global_limiter: RateLimiter::direct(global_quota),
            ip_limiter: RateLimiter::keyed(ip_quota),
            config,
            checks: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Number of client IPs currently holding limiter state
    pub fn tracked_ips(&self) -> usize {
        self.ip_limiter.len()
    }

    /// Drop per-IP entries whose quota has fully replenished.
    ///
    /// Returns the number of entries still tracked.
    pub fn prune(&self) -> usize {
        let before = self.ip_limiter.len();
        self.ip_limiter.retain_recent();
        self.ip_limiter.shrink_to_fit();
        let after = self.ip_limiter.len();
        if before != after {
            debug!(removed = before - after, tracked = after, "Pruned idle rate limit entries");
        }
        after
    }

    /// Check both quotas; the per-IP quota is skipped when the peer is unknown.
    ///
    /// Every [`PRUNE_EVERY`] checks the idle per-IP entries are swept.
    pub fn check(&self, client_ip: Option<IpAddr>) -> Result<(), (LimitScope, u64)> {
        let result = self.check_quotas(client_ip);
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % PRUNE_EVERY == 0 {
            self.prune();
        }
        result
    }

    fn check_quotas(&self, client_ip: Option<IpAddr>) -> Result<(), (LimitScope, u64)> {
        if let Err(not_until) = self.global_limiter.check() {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs();
            return Err((LimitScope::Global, retry_after));
        }

        if let Some(ip) = client_ip
            && let Err(not_until) = self.ip_limiter.check_key(&ip)
        {
            let retry_after = not_until
                .wait_time_from(DefaultClock::default().now())
                .as_secs();
            return Err((LimitScope::Ip, retry_after));
        }

        Ok(())
    }
}

/// Middleware rejecting requests over quota with 429
pub async fn rate_limit_middleware(
    State(limits): State<Arc<RateLimitState>>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Err((scope, retry_after)) = limits.check(client_ip) {
        warn!(
            scope = scope.as_str(),
            client_ip = ?client_ip,
            retry_after,
            "Rate limit exceeded"
        );
        return ApiError::RateLimited { scope, retry_after }.into_response();
    }

    next.run(request).await
}
