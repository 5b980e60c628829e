//! Model strategy to runtime limiter mapping.
use std::{hash::Hash, time::Duration};

use shardq_model::RateLimitStrategy;

use crate::{
    error::QueueError,
    limiter::{BucketLimiter, ItemExponentialLimiter, MaxOfLimiter},
};

/// Build the limiter described by a [`RateLimitStrategy`].
pub fn to_rate_limiter<K>(strategy: &RateLimitStrategy) -> Result<MaxOfLimiter<K>, QueueError>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    strategy.validate()?;
    Ok(MaxOfLimiter::new(vec![
        Box::new(ItemExponentialLimiter::new(
            Duration::from_millis(strategy.base_delay_ms),
            Duration::from_millis(strategy.max_delay_ms),
        )),
        Box::new(BucketLimiter::new(strategy.qps, strategy.burst)),
    ]))
}
