//! This module contains some help functions regarding IP addresses
//!
//! Functions
//! - [peer_id]: The identity of a peer, from the remote end of its session.
//! - [self_ip]: The master's own address on the local network.

use anyhow::{Context, Result};
use local_ip_address::local_ip;
use std::net::{IpAddr, SocketAddr};

use crate::fleet::PeerId;

/// Extracts the peer identity from a session's remote endpoint: the IP, port stripped.
///
/// A slave that reconnects from the same host keeps its identity.
///
/// ## Example
/// ```
/// use elevatormaster::ip_help_functions::peer_id;
/// use std::net::SocketAddr;
///
/// let addr: SocketAddr = "10.100.23.14:51234".parse().unwrap();
/// assert_eq!(peer_id(addr).to_string(), "10.100.23.14");
/// ```
pub fn peer_id(addr: SocketAddr) -> PeerId {
    addr.ip()
}

/// Retrieves the local IP address the master is reachable on.
pub fn self_ip() -> Result<IpAddr> {
    local_ip().context("Failed to get local IP")
}
