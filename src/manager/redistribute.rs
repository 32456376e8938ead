//! Job redistribution for elevators that are gone.
//!
//! Only [crate::fleet::CallState::Call] slots are handed on. Other states are cab calls or runs
//! in progress that do not survive the elevator they belonged to.

use crate::fleet::{ElevatorSnapshot, PeerId};
use crate::message::Event;

/// Synthetic hall calls for every `CALL` slot of a lost elevator.
///
/// Floors ascending, up before down, one event per slot.
pub fn orphaned_calls(lost: &ElevatorSnapshot) -> Vec<Event> {
    lost.calls()
        .into_iter()
        .filter_map(|(floor, dir)| Event::hall_call(floor, dir))
        .collect()
}

/// Outcome of dispatching one hall call, real or synthetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// The hall call
    pub event: Event,
    /// Who got it, `None` if it was dropped
    pub assigned: Option<PeerId>,
}
