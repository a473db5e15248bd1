use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
