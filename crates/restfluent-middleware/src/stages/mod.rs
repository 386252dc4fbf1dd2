//! Reusable middleware stages.
//!
//! - [`rate_limit`] - Fixed-window request ceiling per caller

pub mod rate_limit;

pub use rate_limit::{client_ip, RateLimitBuilder, RateLimitPolicy};
