//! Request logging middleware.
//!
//! Logs every completed request with its method, URI, status, elapsed time
//! and client address, and stamps the response with `x-response-time` and
//! `x-request-id` headers.

use std::net::SocketAddr;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Request, Response};
use futures::future::BoxFuture;
use tower::{Layer, Service};
use uuid::Uuid;

/// The header name for response time (in milliseconds).
pub static RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time");

/// The header carrying the request identifier.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Returns the caller's request id, or a fresh UUID when none was sent.
fn request_id<RequestBody>(request: &Request<RequestBody>) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string)
}

// =============================================================================
// RequestLogLayer
// =============================================================================

/// Layer that measures and logs each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogLayer;

impl RequestLogLayer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<InnerService> Layer<InnerService> for RequestLogLayer {
    type Service = RequestLogService<InnerService>;

    fn layer(&self, inner: InnerService) -> Self::Service {
        RequestLogService { inner }
    }
}

// =============================================================================
// RequestLogService
// =============================================================================

#[derive(Debug, Clone)]
pub struct RequestLogService<InnerService> {
    inner: InnerService,
}

impl<InnerService, RequestBody, ResponseBody> Service<Request<RequestBody>>
    for RequestLogService<InnerService>
where
    InnerService:
        Service<Request<RequestBody>, Response = Response<ResponseBody>> + Clone + Send + 'static,
    InnerService::Future: Send,
    RequestBody: Send + 'static,
    ResponseBody: Send + 'static,
{
    type Response = Response<ResponseBody>;
    type Error = InnerService::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, context: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(context)
    }

    fn call(&mut self, request: Request<RequestBody>) -> Self::Future {
        let start = Instant::now();
        let method = request.method().clone();
        let uri = request.uri().clone();
        let client = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(address)| address.to_string());
        let request_id = request_id(&request);
        let ready = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, ready);

        Box::pin(async move {
            let mut response = inner.call(request).await?;

            let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

            if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms:.2}ms")) {
                response
                    .headers_mut()
                    .insert(RESPONSE_TIME_HEADER.clone(), value);
            }
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(REQUEST_ID_HEADER.clone(), value);
            }

            tracing::info!(
                method = %method,
                uri = %uri,
                status = %response.status(),
                response_time_ms = elapsed_ms,
                client = client.as_deref().unwrap_or("-"),
                request_id = %request_id,
                "Request completed"
            );

            Ok(response)
        })
    }
}
