use std::{io, result};
use thiserror::Error;

/// The result type of the config module.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while loading the stream server configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse the settings, {0}")]
    Parse(String),
    #[error("an io error occurred, {0}")]
    Io(io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Parse(_), Self::Parse(_)) => true,
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

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
