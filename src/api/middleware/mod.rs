//! API middleware components.
//!
//! - [`rate_limit`]: global fixed-window rate limiting
//! - [`request_log`]: request logging and response-time headers

pub mod rate_limit;
pub mod request_log;

pub use rate_limit::{FixedWindow, RATE_LIMITED_MESSAGE, RateLimitConfig, RateLimitLayer};
pub use request_log::{REQUEST_ID_HEADER, RESPONSE_TIME_HEADER, RequestLogLayer};
