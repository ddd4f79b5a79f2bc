//! Fixed-window request limiter, one instance per route.
//!
//! Counters are in memory and keyed by the peer address. `X-Forwarded-For`
//! is only read when the service runs behind a trusted proxy, and then only
//! its right-most hop (the address that proxy saw). A caller's window starts
//! at its first request and resets once `window` has elapsed. Request number
//! `max_requests + 1` inside a window is rejected before the handler runs.
//! Every response on a limited route carries `RateLimit-*` headers; rejections
//! also carry `Retry-After`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{
        header::{HeaderName, RETRY_AFTER},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;
use tracing::warn;

use crate::errors::AppError;

/// Upper bound on tracked clients per route. At the cap, expired windows are
/// dropped first, then the oldest live one.
pub const MAX_TRACKED_CLIENTS: usize = 10_000;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the caller's window resets.
    pub reset_after: Duration,
}

impl RateLimitDecision {
    /// Reset time in whole seconds, rounded up.
    pub fn reset_secs(&self) -> u64 {
        self.reset_after.as_secs() + u64::from(self.reset_after.subsec_nanos() > 0)
    }
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
pub struct RateLimiter {
    route: &'static str,
    policy: RateLimitPolicy,
    trust_proxy: bool,
    max_clients: usize,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(route: &'static str, policy: RateLimitPolicy) -> Self {
        Self {
            route,
            policy,
            trust_proxy: false,
            max_clients: MAX_TRACKED_CLIENTS,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Keys on the proxy-reported client address instead of the peer.
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = max_clients.max(1);
        self
    }

    /// Counts one request for `client`.
    pub fn try_acquire(&self, client: &str) -> RateLimitDecision {
        let now = Instant::now();
        let window_len = self.policy.window;
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if !windows.contains_key(client) && windows.len() >= self.max_clients {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
            if windows.len() >= self.max_clients {
                let oldest = windows
                    .iter()
                    .min_by_key(|(_, w)| w.started)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    windows.remove(&key);
                }
            }
        }

        let window = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        window.count = window.count.saturating_add(1);
        RateLimitDecision {
            allowed: window.count <= self.policy.max_requests,
            limit: self.policy.max_requests,
            remaining: self.policy.max_requests.saturating_sub(window.count),
            reset_after: window_len.saturating_sub(now.duration_since(window.started)),
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Middleware: rejects over-limit callers with 429 before the handler runs.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request, limiter.trust_proxy);
    let decision = limiter.try_acquire(&client);

    if !decision.allowed {
        warn!(route = limiter.route, client = %client, "rate limit exceeded");
        let mut response = AppError::RateLimited.into_response();
        apply_headers(response.headers_mut(), &decision);
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(decision.reset_secs()));
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATELIMIT_RESET, HeaderValue::from(decision.reset_secs()));
}

/// Peer address, or with `trust_proxy` the right-most `x-forwarded-for` hop.
/// Requests with neither share one bucket.
fn client_key(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
