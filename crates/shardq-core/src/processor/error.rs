use std::error::Error as StdError;

use thiserror::Error;

/// Failure reported by a single process call.
///
/// Every variant is retried by the manager with rate-limited backoff.
/// A processor that wants to stop retrying returns a stable outcome instead.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{reason}")]
    Fail { reason: String },

    /// The call panicked and the manager recovered it.
    #[error("panicked: {reason}")]
    Panicked { reason: String },

    #[error("{0}")]
    Source(#[source] Box<dyn StdError + Send + Sync>),
}

impl ProcessError {
    pub fn fail(reason: impl Into<String>) -> Self {
        ProcessError::Fail {
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error, keeping it as the source.
    pub fn from_source<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ProcessError::Source(Box::new(err))
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, ProcessError::Panicked { .. })
    }
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::from_source(e)
    }
}
