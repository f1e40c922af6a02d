// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing
//!
//! This module provides per-client rate limiting for the joke endpoints. Every
//! client draws from two independent budgets: requests answered by an external
//! joke provider spend the upstream quota, everything else is served from the
//! joke store and gets a larger allowance.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    body::Body,
    extract::{ConnectInfo, Query, State},
    http::{Method, Request, Uri},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use shared_types::JokeSource;
use tracing::{debug, warn};

use crate::{config::RateLimitingConfig, error::ServerError, routes::jokes::JokeTypeQuery};

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
const MAX_TRACKED_WINDOWS: usize = 10_000;

/// Request budget a client draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateBudget {
    /// `GET /joke` for a source fetched from an external provider
    Provider,
    /// Requests served from the joke store
    Store,
}

impl RateBudget {
    /// Classify a request routed under `/api`
    pub fn for_request<B>(req: &Request<B>) -> Self {
        if req.method() == Method::GET
            && req.uri().path().ends_with("/joke")
            && requested_source(req.uri()).is_some_and(JokeSource::is_external)
        {
            Self::Provider
        } else {
            Self::Store
        }
    }

    /// Label used in log fields
    pub const fn label(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Store => "store",
        }
    }
}

fn requested_source(uri: &Uri) -> Option<JokeSource> {
    let Query(query) = Query::<JokeTypeQuery>::try_from_uri(uri).ok()?;
    query.joke_type?.parse().ok()
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    used: u32,
}

/// Rate limiting middleware state
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitingConfig,
    windows: Arc<DashMap<(IpAddr, RateBudget), Window>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration
    pub fn new(config: RateLimitingConfig) -> Self {
        Self {
            config,
            windows: Arc::new(DashMap::new()),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn limit(&self, budget: RateBudget) -> u32 {
        match budget {
            RateBudget::Provider => self.config.provider_requests_per_minute,
            RateBudget::Store => self.config.requests_per_minute,
        }
    }

    /// Take one request from the client's budget
    ///
    /// # Errors
    ///
    /// Returns the seconds until the client's current window resets when the
    /// budget is spent. Rejected requests do not count against the budget.
    pub fn try_acquire(&self, ip: IpAddr, budget: RateBudget) -> Result<(), u64> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();
        if self.windows.len() >= MAX_TRACKED_WINDOWS {
            self.evict_expired(now);
        }

        let limit = self.limit(budget);
        let mut window = self.windows.entry((ip, budget)).or_insert(Window {
            started: now,
            used: 0,
        });

        if now.duration_since(window.started) >= RATE_LIMIT_WINDOW {
            *window = Window {
                started: now,
                used: 0,
            };
        }

        if window.used >= limit {
            let remaining = RATE_LIMIT_WINDOW.saturating_sub(now.duration_since(window.started));
            debug!(%ip, budget = budget.label(), used = window.used, "budget spent");
            return Err(whole_seconds(remaining).max(1));
        }

        window.used += 1;
        Ok(())
    }

    /// Forget windows that have expired, or every window if that is not enough
    fn evict_expired(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.duration_since(window.started) < RATE_LIMIT_WINDOW);
        let after = self.windows.len();

        debug!(evicted = before.saturating_sub(after), "evicted expired rate limit windows");

        if after >= MAX_TRACKED_WINDOWS {
            warn!(tracked = after, "rate limiter full of live windows, resetting all budgets");
            self.windows.clear();
        }
    }

    #[cfg(test)]
    fn tracked_windows(&self) -> usize {
        self.windows.len()
    }
}

fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// Rate limiting middleware function
///
/// Requires the router to be served with `ConnectInfo<SocketAddr>`.
pub async fn rate_limiting_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(rate_limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let client_ip = addr.ip();
    let budget = RateBudget::for_request(&req);

    if let Err(retry_after_seconds) = rate_limiter.try_acquire(client_ip, budget) {
        warn!(%client_ip, budget = budget.label(), retry_after_seconds, "rate limit exceeded");
        return Err(ServerError::RateLimited {
            retry_after_seconds,
        });
    }

    Ok(next.run(req).await)
}
