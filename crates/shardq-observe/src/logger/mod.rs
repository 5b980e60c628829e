mod config;
mod error;
mod log;
mod object;

pub use config::{ENV_FORMAT, ENV_LEVEL, ENV_TZ, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339, LoggerTimeZone, init_local_offset};

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Fails with [`LoggerError::AlreadyInitialized`] if a global subscriber is set.
/// With [`LoggerTimeZone::Local`], call [`init_local_offset`] first.
///
/// ```rust,no_run
/// use shardq_observe::{LoggerConfig, init_logger};
///
/// let cfg = LoggerConfig::from_env().expect("logger env");
/// init_logger(&cfg).expect("logger init");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}
