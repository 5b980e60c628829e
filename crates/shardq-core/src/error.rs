use thiserror::Error;

use shardq_model::{ControllerKind, ModelError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid manager configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build controller '{kind}': {reason}")]
    Controller { kind: ControllerKind, reason: String },

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
