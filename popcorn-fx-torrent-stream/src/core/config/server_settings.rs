use crate::core::config::Result;
use crate::core::utils::network::ip_addr;
use derive_more::Display;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::IpAddr;
use std::path::Path;

const DEFAULT_HOST: fn() -> Option<IpAddr> = || None;
const DEFAULT_PORT: fn() -> u16 = || 0;

/// The settings of the stream server listener.
#[derive(Debug, Display, Clone, Serialize, Deserialize, PartialEq)]
#[display("host: {:?}, port: {}", host, port)]
pub struct ServerSettings {
    /// The host which is advertised within the stream urls.
    /// The local network address is used when no host has been configured.
    #[serde(default = "DEFAULT_HOST")]
    pub host: Option<IpAddr>,
    /// The port to bind the listener to, `0` lets the OS assign a port.
    #[serde(default = "DEFAULT_PORT")]
    pub port: u16,
}

impl ServerSettings {
    /// Create new server settings for the given host and port.
    pub fn new(host: Option<IpAddr>, port: u16) -> Self {
        Self { host, port }
    }

    /// Load the server settings from the given YAML file.
    ///
    /// Missing fields fall back to their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading server settings from {:?}", path);
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(contents.as_str())
    }

    /// Parse the server settings from the given YAML value.
    pub fn from_yaml(value: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(value)?)
    }

    /// Returns the host address on which streams are advertised.
    /// This resolves the local network address when no host has been configured.
    pub fn host_addr(&self) -> IpAddr {
        self.host.unwrap_or_else(ip_addr)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST(),
            port: DEFAULT_PORT(),
        }
    }
}
