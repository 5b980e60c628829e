mod ratelimit;
pub use ratelimit::RateLimitStrategy;
