//! Global fixed-window rate limiting.
//!
//! All clients share one counter. The first request after the window has
//! elapsed starts a new window.

use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};

use crate::api::error::ApiErrorResponse;
use crate::infrastructure::{ConfigurationError, parse_env};

/// Message sent with every 429 response.
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests in a minute";

// =============================================================================
// Configuration
// =============================================================================

/// Quota for the fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Reads `RATE_LIMIT_MAX_REQUESTS` and `RATE_LIMIT_WINDOW_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` when either variable does
    /// not parse or is zero.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let defaults = Self::default();
        let max_requests: u32 = parse_env("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?;
        let window_seconds: u64 =
            parse_env("RATE_LIMIT_WINDOW_SECONDS", defaults.window.as_secs())?;

        if max_requests == 0 {
            return Err(ConfigurationError::InvalidValue {
                variable: "RATE_LIMIT_MAX_REQUESTS".to_string(),
                value: "0".to_string(),
            });
        }
        if window_seconds == 0 {
            return Err(ConfigurationError::InvalidValue {
                variable: "RATE_LIMIT_WINDOW_SECONDS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            max_requests,
            window: Duration::from_secs(window_seconds),
        })
    }
}

// =============================================================================
// FixedWindow
// =============================================================================

#[derive(Debug)]
struct WindowState {
    started: Instant,
    count: u32,
}

/// A fixed-window request counter.
#[derive(Debug)]
pub struct FixedWindow {
    config: RateLimitConfig,
    state: Mutex<WindowState>,
}

impl FixedWindow {
    /// Creates a limiter whose first window starts now.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Mutex::new(WindowState {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    /// Returns the configured quota.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts one request and reports whether it is admitted.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Counts one request arriving at `now`.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if now.saturating_duration_since(state.started) >= self.config.window {
            state.started = now;
            state.count = 0;
        }
        if state.count >= self.config.max_requests {
            return false;
        }
        state.count += 1;
        true
    }
}

// =============================================================================
// RateLimitLayer
// =============================================================================

/// Layer that rejects requests over the shared quota with 429.
#[derive(Debug, Clone)]
pub struct RateLimitLayer {
    limiter: Arc<FixedWindow>,
}

impl RateLimitLayer {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: Arc::new(FixedWindow::new(config)),
        }
    }

    /// Returns the shared limiter.
    #[must_use]
    pub fn limiter(&self) -> &Arc<FixedWindow> {
        &self.limiter
    }
}

impl<InnerService> Layer<InnerService> for RateLimitLayer {
    type Service = RateLimitService<InnerService>;

    fn layer(&self, inner: InnerService) -> Self::Service {
        RateLimitService {
            inner,
            limiter: Arc::clone(&self.limiter),
        }
    }
}

// =============================================================================
// RateLimitService
// =============================================================================

/// Service produced by [`RateLimitLayer`].
#[derive(Debug, Clone)]
pub struct RateLimitService<InnerService> {
    inner: InnerService,
    limiter: Arc<FixedWindow>,
}

impl<InnerService, RequestBody> Service<Request<RequestBody>> for RateLimitService<InnerService>
where
    InnerService: Service<Request<RequestBody>, Response = Response> + Clone + Send + 'static,
    InnerService::Future: Send,
    RequestBody: Send + 'static,
{
    type Response = Response;
    type Error = InnerService::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, context: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(context)
    }

    fn call(&mut self, request: Request<RequestBody>) -> Self::Future {
        if !self.limiter.try_acquire() {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                "rate limit exceeded"
            );
            return Box::pin(async {
                Ok(ApiErrorResponse::too_many_requests(RATE_LIMITED_MESSAGE).into_response())
            });
        }

        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);
        Box::pin(async move { inner.call(request).await })
    }
}

// =============================================================================
// Tests
// =============================================================================
