mod error;
pub use error::QueueError;

mod limiter;
pub use limiter::{
    BucketLimiter, ItemExponentialLimiter, MaxOfLimiter, RateLimiter, default_controller_limiter,
};

mod map;
pub use map::to_rate_limiter;

mod workqueue;
pub use workqueue::WorkQueue;

#[cfg(test)]
mod scenarios;
