use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

/// Value of the port cell while no listener is bound.
const UNBOUND_PORT: u16 = 0;

/// The address on which the stream server is reachable by media players.
///
/// The host is fixed at construction, while the port is published by the server once its
/// listener has been bound and cleared again on shutdown.
/// Cloned instances share the same port cell.
#[derive(Debug, Clone)]
pub struct ServerAddress {
    host: IpAddr,
    port: Arc<AtomicU16>,
}

impl ServerAddress {
    /// Create a new, unbound, server address for the given host.
    pub fn new(host: IpAddr) -> Self {
        Self {
            host,
            port: Arc::new(AtomicU16::new(UNBOUND_PORT)),
        }
    }

    /// Returns the advertised host.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    /// Returns the port of the currently bound listener.
    /// It returns [None] when no listener is bound.
    pub fn port(&self) -> Option<u16> {
        match self.port.load(Ordering::Acquire) {
            UNBOUND_PORT => None,
            port => Some(port),
        }
    }

    /// Returns the socket address of the currently bound listener, if any.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.port().map(|port| SocketAddr::new(self.host, port))
    }

    /// Publish the port of the bound listener.
    pub(crate) fn bind(&self, port: u16) {
        self.port.store(port, Ordering::Release);
    }

    /// Clear the published port.
    pub(crate) fn unbind(&self) {
        self.port.store(UNBOUND_PORT, Ordering::Release);
    }
}
