use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::logger::LoggerError;

/// Validated `EnvFilter` directive string, such as `info` or
/// `shardq_core=debug,shardq_queue=trace,info`.
///
/// ```
/// use shardq_observe::LoggerLevel;
///
/// let lvl: LoggerLevel = "shardq_core=debug,info".parse().unwrap();
/// assert_eq!(lvl.as_str(), "shardq_core=debug,info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(s: impl Into<String>) -> Result<Self, LoggerError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter. Falls back to `info` if the directive stopped parsing,
    /// which cannot happen for values built through this type.
    pub fn to_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.0).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LoggerError::InvalidLevel("empty filter".into()));
        }
        EnvFilter::try_new(trimmed).map_err(|e| LoggerError::InvalidLevel(format!("{trimmed}: {e}")))?;
        Ok(Self(trimmed.to_string()))
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

#[cfg(test)]
mod tests {
    use super::LoggerLevel;

    #[test]
    fn accepts_plain_and_per_target_levels() {
        for ok in ["info", "warn", "trace", "shardq_core=debug,shardq_queue=trace,info"] {
            assert!(ok.parse::<LoggerLevel>().is_ok(), "{ok}");
        }
    }

    #[test]
    fn rejects_bad_directives() {
        for bad in ["", "   ", "shardq_core=verbose", "a=trace,b=wat"] {
            assert!(bad.parse::<LoggerLevel>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn trims_input() {
        let lvl: LoggerLevel = "  debug ".parse().unwrap();
        assert_eq!(lvl.as_str(), "debug");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let lvl: LoggerLevel = serde_json::from_str(r#""shardq_core=trace,info""#).unwrap();
        assert_eq!(lvl.as_str(), "shardq_core=trace,info");
        assert_eq!(serde_json::to_string(&lvl).unwrap(), r#""shardq_core=trace,info""#);
        assert!(serde_json::from_str::<LoggerLevel>(r#""x=nope""#).is_err());
    }

    #[test]
    fn default_is_info() {
        assert_eq!(LoggerLevel::default().as_str(), "info");
        let _ = LoggerLevel::default().to_env_filter();
    }
}
