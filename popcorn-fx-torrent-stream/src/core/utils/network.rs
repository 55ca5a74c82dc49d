use std::net::{IpAddr, Ipv4Addr};

use local_ip_address::local_ip;
use log::warn;

/// Retrieves a non-localhost IP address from one of the machine's network interfaces.
///
/// # Returns
///
/// The local IP address found on one of the network interfaces, else the loopback address.
pub fn ip_addr() -> IpAddr {
    match local_ip() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Unable to resolve a local network address, {}", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}
