use popcorn_fx_torrent_stream::core::{config, stream};
use std::{io, result};
use thiserror::Error;

/// The result type of the stream application.
pub type Result<T> = result::Result<T, Error>;

/// The errors which terminate the stream application.
#[derive(Debug, Error)]
pub enum Error {
    #[error("a logger instance has already been initialized")]
    AlreadyInitialized,
    #[error("logger configuration is invalid, {0}")]
    InvalidLogConfig(String),
    #[error("failed to load the server settings, {0}")]
    Config(config::Error),
    #[error("failed to start the stream server, {0}")]
    Server(stream::Error),
    #[error("none of the given files could be streamed")]
    NoStreams,
    #[error("an io error occurred, {0}")]
    Io(io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::AlreadyInitialized, Error::AlreadyInitialized) => true,
            (Error::InvalidLogConfig(_), Error::InvalidLogConfig(_)) => true,
            (Error::Config(a), Error::Config(b)) => a == b,
            (Error::Server(a), Error::Server(b)) => a == b,
            (Error::NoStreams, Error::NoStreams) => true,
            (Error::Io(_), Error::Io(_)) => true,
            _ => false,
        }
    }
}

impl From<config::Error> for Error {
    fn from(err: config::Error) -> Self {
        Error::Config(err)
    }
}

impl From<stream::Error> for Error {
    fn from(err: stream::Error) -> Self {
        Error::Server(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
