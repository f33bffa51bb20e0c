use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("content mix must contain at least one entry")]
    EmptyMix,

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timeout after {0}ms")]
    Timeout(u64),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeedError>;
