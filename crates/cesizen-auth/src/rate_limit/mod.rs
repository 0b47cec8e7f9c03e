//! Failed-attempt rate limiting.

pub mod limiter;

pub use limiter::RateLimiter;
