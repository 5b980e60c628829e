use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Retry pacing for a rate-limited work queue.
///
/// Two limits are combined and the longer delay wins:
/// - per key exponential backoff: `base_delay_ms * 2^failures`, capped at `max_delay_ms`;
/// - overall token bucket: `qps` sustained re-deliveries with bursts up to `burst`.
///
/// Defaults match the usual controller limiter (5ms .. 1000s, 10 qps, burst 100).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitStrategy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub qps: f64,
    pub burst: u32,
}

impl Default for RateLimitStrategy {
    fn default() -> Self {
        Self {
            base_delay_ms: 5,
            max_delay_ms: 1_000_000,
            qps: 10.0,
            burst: 100,
        }
    }
}

impl RateLimitStrategy {
    pub fn validate(&self) -> ModelResult<()> {
        if self.base_delay_ms > self.max_delay_ms {
            return Err(ModelError::Invalid(format!(
                "baseDelayMs ({}) exceeds maxDelayMs ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        if !self.qps.is_finite() || self.qps <= 0.0 {
            return Err(ModelError::Invalid(format!("qps must be positive, got {}", self.qps)));
        }
        if self.burst == 0 {
            return Err(ModelError::Invalid("burst must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        RateLimitStrategy::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: RateLimitStrategy = serde_json::from_str(r#"{"qps": 50.0}"#).unwrap();
        assert_eq!(s.qps, 50.0);
        assert_eq!(s.base_delay_ms, 5);
        assert_eq!(s.burst, 100);
    }

    #[test]
    fn validate_catches_inverted_bounds_and_bad_bucket() {
        let inverted = RateLimitStrategy {
            base_delay_ms: 10,
            max_delay_ms: 1,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let no_qps = RateLimitStrategy {
            qps: 0.0,
            ..Default::default()
        };
        assert!(no_qps.validate().is_err());

        let no_burst = RateLimitStrategy {
            burst: 0,
            ..Default::default()
        };
        assert!(no_burst.validate().is_err());
    }
}
