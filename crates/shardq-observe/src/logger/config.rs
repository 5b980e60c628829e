use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{
    error::{LoggerError, LoggerResult},
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Filter directive, e.g. `info` or `shardq_core=debug,info`.
pub const ENV_LEVEL: &str = "SHARDQ_LOG";
/// `text`, `json` or `journald`.
pub const ENV_FORMAT: &str = "SHARDQ_LOG_FORMAT";
/// `utc` or `local`.
pub const ENV_TZ: &str = "SHARDQ_LOG_TZ";

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    /// Timezone of timestamps (text and json formats).
    pub tz: LoggerTimeZone,
    /// Include the event target (module path).
    pub with_targets: bool,
    /// Color text output; ignored when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Defaults overridden by `SHARDQ_LOG`, `SHARDQ_LOG_FORMAT` and `SHARDQ_LOG_TZ`.
    pub fn from_env() -> LoggerResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`LoggerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LoggerResult<Self> {
        let mut cfg = Self::default();
        let get = |var: &'static str| lookup(var).filter(|v| !v.trim().is_empty()).map(|v| (var, v));

        if let Some((var, v)) = get(ENV_LEVEL) {
            cfg.level = v.parse().map_err(|e: LoggerError| invalid(var, e))?;
        }
        if let Some((var, v)) = get(ENV_FORMAT) {
            cfg.format = v.parse().map_err(|e: LoggerError| invalid(var, e))?;
        }
        if let Some((var, v)) = get(ENV_TZ) {
            cfg.tz = v.parse().map_err(|e: LoggerError| invalid(var, e))?;
        }
        Ok(cfg)
    }

    /// Color only when enabled and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

fn invalid(var: &'static str, e: LoggerError) -> LoggerError {
    LoggerError::InvalidEnv {
        var,
        reason: e.to_string(),
    }
}
