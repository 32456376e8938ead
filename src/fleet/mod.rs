//! # Fleet
//!
//! The master's picture of the elevators it coordinates.
//!
//! - [ElevatorSnapshot]: what one elevator last reported (runs, floor, direction).
//! - [FleetSnapshot]: every elevator keyed by the IP of its slave. This is also the value
//!   broadcast as a backup, so any slave can seed a new master.
//! - [registry::FleetRegistry]: the live fleet, with a connection handle per elevator.
//! - [serial]: bincode encoding of the above for the wire.

pub mod registry;
pub mod serial;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

use crate::config;

/// Identity of a peer: the IP of its TCP session, without port.
pub type PeerId = IpAddr;

/// Every elevator known to the master, keyed by peer.
///
/// Ordered so the dispatcher sees the fleet in the same order every time.
pub type FleetSnapshot = BTreeMap<PeerId, ElevatorSnapshot>;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Direction an elevator last reported moving in.
pub enum Dirn {
    Down = -1,
    Stop = 0,
    Up = 1,
}

impl Dirn {
    /// The direction as a signed unit, used in the dispatcher's cost math.
    pub fn sign(self) -> i32 {
        self as i32
    }
}

/// State of one up/down slot at one floor of an elevator.
///
/// The master only cares about [CallState::Call] (a hall call it can hand to someone else)
/// versus anything pending at all. The slave uses other codes for cab calls and runs in
/// progress; they are carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CallState {
    /// Nothing pending
    #[default]
    None,
    /// A hall call assigned to this elevator
    Call,
    /// Slave internal state, opaque to the master
    Internal(u8),
}

impl CallState {
    /// true for anything but [CallState::None]
    pub fn is_pending(self) -> bool {
        self != CallState::None
    }

    /// true only for a hall call that can be handed to another elevator
    pub fn is_call(self) -> bool {
        self == CallState::Call
    }
}


/// The master's picture of one elevator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ElevatorSnapshot {
    /// Up-run state per floor.
    /// Default: all [CallState::None]
    pub upruns: [CallState; config::N_FLOORS],

    /// Down-run state per floor.
    /// Default: all [CallState::None]
    pub downruns: [CallState; config::N_FLOORS],

    /// Last floor the elevator reported.
    /// Default: 0
    pub current_floor: u8,

    /// Last reported motion.
    /// Default: [Dirn::Stop]
    pub dir: Dirn,
}

impl Default for ElevatorSnapshot {
    fn default() -> Self {
        Self {
            upruns: [CallState::None; config::N_FLOORS],
            downruns: [CallState::None; config::N_FLOORS],
            current_floor: 0,
            dir: Dirn::Stop,
        }
    }
}

impl ElevatorSnapshot {
    /// All slots holding a [CallState::Call], as `(floor, direction)`.
    ///
    /// Floors ascending, up before down at the same floor.
    pub fn calls(&self) -> Vec<(u8, Dirn)> {
        let mut calls = Vec::new();
        for floor in 0..config::N_FLOORS {
            if self.upruns[floor].is_call() {
                calls.push((floor as u8, Dirn::Up));
            }
            if self.downruns[floor].is_call() {
                calls.push((floor as u8, Dirn::Down));
            }
        }
        calls
    }

    /// Checks that the reported floor exists in this building.
    pub fn is_valid(&self) -> bool {
        (self.current_floor as usize) < config::N_FLOORS
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_idle_at_ground_floor() {
        let elev = ElevatorSnapshot::default();
        assert_eq!(elev.current_floor, 0);
        assert_eq!(elev.dir, Dirn::Stop);
        assert!(elev.calls().is_empty());
    }

    #[test]
    fn calls_only_lists_call_state() {
        let mut elev = ElevatorSnapshot::default();
        elev.upruns[2] = CallState::Call;
        elev.downruns[2] = CallState::Call;
        elev.downruns[1] = CallState::Internal(2);
        elev.upruns[0] = CallState::Internal(7);

        assert_eq!(elev.calls(), vec![(2, Dirn::Up), (2, Dirn::Down)]);
        assert!(elev.downruns[1].is_pending());
        assert!(!elev.downruns[1].is_call());
    }

    #[test]
    fn floor_outside_building_is_invalid() {
        let mut elev = ElevatorSnapshot::default();
        elev.current_floor = config::N_FLOORS as u8;
        assert!(!elev.is_valid());
    }
}
