use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown controller kind: {0}")]
    UnknownControllerKind(String),

    #[error("controller list cannot be empty")]
    EmptyControllerList,

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid flag value: {0}")]
    InvalidFlag(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
