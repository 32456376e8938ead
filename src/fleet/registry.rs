//! # Fleet registry
//!
//! The live fleet: latest [ElevatorSnapshot] and session handle per peer.
//! The registry itself is not synchronized. It lives inside the master state, and every access
//! goes through the master's single guard (see [crate::master]).

use std::collections::BTreeMap;

use crate::fleet::{ElevatorSnapshot, FleetSnapshot, PeerId};
use crate::network::PeerLink;

/// One registered elevator.
#[derive(Debug, Clone)]
pub struct FleetEntry<L> {
    /// What the elevator last reported
    pub snapshot: ElevatorSnapshot,
    /// Session the elevator is reachable on
    pub conn: L,
}

/// Peer id → latest snapshot and live connection.
#[derive(Debug, Clone)]
pub struct FleetRegistry<L> {
    entries: BTreeMap<PeerId, FleetEntry<L>>,
}

impl<L> Default for FleetRegistry<L> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<L: PeerLink> FleetRegistry<L> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer. A peer already registered under the same id is replaced
    /// (last writer wins) and returned.
    pub fn add(&mut self, peer: PeerId, snapshot: ElevatorSnapshot, conn: L) -> Option<FleetEntry<L>> {
        self.entries.insert(peer, FleetEntry { snapshot, conn })
    }

    /// Unregisters a peer and returns what it last reported.
    pub fn remove(&mut self, peer: &PeerId) -> Option<ElevatorSnapshot> {
        self.entries.remove(peer).map(|entry| entry.snapshot)
    }

    /// Replaces a peer's snapshot and rebinds it to `conn`. Registers the peer if unknown.
    pub fn update(&mut self, peer: PeerId, snapshot: ElevatorSnapshot, conn: L) {
        self.entries.insert(peer, FleetEntry { snapshot, conn });
    }

    /// Latest snapshot of a peer.
    pub fn lookup(&self, peer: &PeerId) -> Option<&ElevatorSnapshot> {
        self.entries.get(peer).map(|entry| &entry.snapshot)
    }

    /// Session a peer is bound to.
    pub fn link(&self, peer: &PeerId) -> Option<&L> {
        self.entries.get(peer).map(|entry| &entry.conn)
    }

    /// true if `peer` is registered and bound to the session `session_id`.
    pub fn is_bound_to(&self, peer: &PeerId, session_id: u64) -> bool {
        self.link(peer).map_or(false, |conn| conn.session_id() == session_id)
    }

    /// All peers and their snapshots, in peer order.
    pub fn iterate(&self) -> impl Iterator<Item = (&PeerId, &ElevatorSnapshot)> {
        self.entries.iter().map(|(peer, entry)| (peer, &entry.snapshot))
    }

    /// All peers and their sessions, in peer order.
    pub fn links(&self) -> impl Iterator<Item = (&PeerId, &L)> {
        self.entries.iter().map(|(peer, entry)| (peer, &entry.conn))
    }

    /// Number of registered peers.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// true if no peer is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fleet without connection handles: what the dispatcher reads and the backup carries.
    pub fn fleet_snapshot(&self) -> FleetSnapshot {
        self.iterate().map(|(peer, elev)| (*peer, elev.clone())).collect()
    }
}
