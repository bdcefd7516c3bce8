use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("ledger error: {0}")]
    Ledger(#[from] tinybatch_ledger::LedgerError),
    #[error("compress error: {0}")]
    Compress(#[from] compress::CompressError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
