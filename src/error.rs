use thiserror::Error;

/// Errors raised while setting up a generation request. None of these are recoverable by
/// retrying; the caller must fix the input or the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("pixel buffer holds {actual} pixels but the bitmap size requires {expected}")]
    InvalidBitmap { expected: usize, actual: usize },
    #[error("source bitmap has no pixels")]
    EmptyBitmap,
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig(message.into())
    }
}

/// Why a run stopped before every cell was decided. A contradiction is expected from time to
/// time; the run is reset and may be attempted again.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateError {
    #[error("contradiction: a cell has no compatible patterns")]
    Contradiction,
    #[error("the run was cancelled")]
    Cancelled,
}

pub type Result<T> = ::std::result::Result<T, Error>;
