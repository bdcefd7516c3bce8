use std::io;

use tinybatch_core::FailureKind;
use tinybatch_ledger::LedgerError;

/// Errors raised while compressing a single image.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("api key rejected: {0}")]
    Account(String),
    #[error("request rejected: {0}")]
    Request(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("connection error: {0}")]
    Connection(String),
}

impl CompressError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Ledger(LedgerError::Exhausted { .. }) => FailureKind::Exhausted,
            Self::Account(_) => FailureKind::Account,
            Self::Request(_) => FailureKind::Request,
            Self::Server(_) => FailureKind::Server,
            Self::Connection(_) => FailureKind::Connection,
            Self::Io(_) | Self::Ledger(_) | Self::Image(_) => FailureKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
