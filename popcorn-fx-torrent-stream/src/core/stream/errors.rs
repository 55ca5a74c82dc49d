use std::{io, result};
use thiserror::Error;

/// The result type of the stream module.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur during streaming operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid stream range")]
    InvalidRange,
    #[error("stream parsing error occurred, {0}")]
    Parse(String),
    #[error("range start {start} is beyond the resource length {len}")]
    RangeNotSatisfiable { start: u64, len: u64 },
    #[error("an io error occurred, {0}")]
    Io(io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidRange, Self::InvalidRange) => true,
            (Self::Parse(_), Self::Parse(_)) => true,
            (
                Self::RangeNotSatisfiable { start, len },
                Self::RangeNotSatisfiable {
                    start: other_start,
                    len: other_len,
                },
            ) => start == other_start && len == other_len,
            (Self::Io(_), Self::Io(_)) => true,
            _ => false,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
