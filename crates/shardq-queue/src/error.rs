use thiserror::Error;

use shardq_model::ModelError;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid rate limit strategy: {0}")]
    InvalidStrategy(#[from] ModelError),
}
