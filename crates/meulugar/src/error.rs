use thiserror::Error;

#[derive(Error, Debug)]
pub enum LugarError {
    #[error("Place not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Quota exceeded: {needed} bytes requested, limit is {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid place: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LugarError>;
