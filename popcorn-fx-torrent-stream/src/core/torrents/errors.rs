use std::io;
use thiserror::Error;

use crate::core::torrents::StreamState;

/// The torrent package specific results.
pub type Result<T> = std::result::Result<T, Error>;

/// The torrent error describes exceptions which have occurred when handling
/// torrent stream actions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid argument, {0}")]
    InvalidArgument(String),
    #[error("torrent \"{0}\" is not ready to be streamed")]
    StreamPreparation(String),
    #[error("stream server configuration is invalid, {0}")]
    Configuration(String),
    #[error("a stream for \"{0}\" already exists")]
    AlreadyExists(String),
    #[error("torrent stream has invalid state {0}")]
    InvalidStreamState(StreamState),
    #[error("failed to release torrent, {0}")]
    Release(String),
    #[error("an io error occurred, {0}")]
    Io(String),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let result = Error::from(io::Error::new(io::ErrorKind::Other, "Foo"));

        assert_eq!(Error::Io("Foo".to_string()), result);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            "torrent \"movie.mp4\" is not ready to be streamed",
            Error::StreamPreparation("movie.mp4".to_string()).to_string()
        );
        assert_eq!(
            "torrent stream has invalid state Stopped",
            Error::InvalidStreamState(StreamState::Stopped).to_string()
        );
    }
}
