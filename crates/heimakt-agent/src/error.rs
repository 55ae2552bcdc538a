use heimakt_core::CatalogError;
use heimakt_qtable::QTableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no resolvable intent for task: {0:?}")]
    UnresolvableIntent(String),
    #[error("no task is awaiting feedback")]
    NoPendingTask,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("policy store error: {0}")]
    Policy(#[from] QTableError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
