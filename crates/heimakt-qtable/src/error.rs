use thiserror::Error;

#[derive(Debug, Error)]
pub enum QTableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u32),
    #[error("tabular export malformed: {0}")]
    Tabular(String),
    #[error("non-finite reward rejected: {0}")]
    NonFiniteReward(f32),
}

pub type Result<T> = std::result::Result<T, QTableError>;
