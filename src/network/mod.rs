//! ## Network module
//!
//! The contract between the master core and the transport, and the transports themselves.
//!
//! ## Sub-modules
//! - [tcp_network]: accepts slave sessions, frames messages, and turns session lifecycle into [NetEvent]s.
//! - [udp_broadcast]: periodic discovery beacon so slaves can find the master.
//!
//! ## Contract
//! The core only sees [NetEvent]s on one queue, and a [PeerLink] per session to answer on.
//! Events from one session arrive in the order they were read.

pub mod tcp_network;
pub mod udp_broadcast;

use anyhow::Result;
use std::net::SocketAddr;

use crate::message::{Message, Outbound};

/// Handle to one slave session.
///
/// Clones refer to the same session. Sending must not block on the peer: implementations
/// queue the message and write it from their own task, so the master can send while holding
/// the fleet guard.
pub trait PeerLink: Clone + Send + Sync + 'static {
    /// Unique per session for the lifetime of the process. A reconnect gets a new id.
    fn session_id(&self) -> u64;

    /// Remote endpoint of the session.
    fn peer_addr(&self) -> SocketAddr;

    /// Queues `msg` for the peer.
    ///
    /// ## Errors
    /// The message could not be encoded, or the session is already closed.
    fn send(&self, msg: &Outbound) -> Result<()>;
}

/// What the transport tells the master.
#[derive(Debug, Clone)]
pub enum NetEvent<L> {
    /// A slave opened a session
    NewConnection(L),
    /// A session ended or failed
    LostConnection(L),
    /// A framed payload arrived
    Message(Message<L>),
}
