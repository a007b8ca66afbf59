use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParallelError {
    #[error("Invalid max lines: {0} (must be > 0)")]
    InvalidMaxLines(usize),

    #[error("Invalid thread count: {0} (must be > 0)")]
    InvalidThreadCount(usize),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(io::Error),

    #[error("IO error: {0}")]
    Io(io::Error),

    #[error("Partition processing error: {0}")]
    Processing(anyhow::Error),

    #[error("Partition worker panicked: {0}")]
    Panicked(String),

    #[error("Partition task was dropped before completion")]
    Disconnected,
}

impl From<io::Error> for ParallelError {
    fn from(err: io::Error) -> Self {
        ParallelError::Io(err)
    }
}

impl From<anyhow::Error> for ParallelError {
    fn from(err: anyhow::Error) -> Self {
        ParallelError::Processing(err)
    }
}

pub type Result<T> = std::result::Result<T, ParallelError>;
