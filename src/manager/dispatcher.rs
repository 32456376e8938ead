//! # Hall call dispatcher
//!
//! Picks the elevator that should serve a hall call, using travel distance in floors as cost.
//!
//! For each elevator in the fleet:
//! 1. If any elevator already has a pending run at the call's floor in the call's direction,
//!    the call is in flight and nobody gets it.
//! 2. An idle elevator, or one moving towards the floor in the requested direction, costs the
//!    distance to the floor. Idle elevators win ties.
//! 3. Anything else costs the trip to its furthest pending run in its current direction, then
//!    back to the floor.

use crate::config;
use crate::fleet::{Dirn, ElevatorSnapshot, FleetSnapshot, PeerId};
use crate::message::Event;

/// What to do with a moving elevator that has no pending run in its direction.
///
/// The turn-around floor is undefined in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrongDirectionPolicy {
    /// Turn around where it is: cost is the distance from the current floor
    TreatAsIdle,
    /// Leave the elevator out of this call
    Ineligible,
}

/// Finds the peer that should serve `event`.
///
/// ## Returns
/// - `Some(peer)`: the cheapest elevator.
/// - `None`: `event` is not a hall call, its floor does not exist, the call is already
///   assigned somewhere in the fleet, or no elevator is eligible (e.g. an empty fleet).
///
/// ## Example
/// ```
/// use elevatormaster::fleet::{ElevatorSnapshot, FleetSnapshot};
/// use elevatormaster::manager::dispatcher::{find_most_suitable, WrongDirectionPolicy};
/// use elevatormaster::message::{Event, EventType};
///
/// let mut fleet = FleetSnapshot::new();
/// let mut far = ElevatorSnapshot::default();
/// far.current_floor = 3;
/// fleet.insert("10.0.0.1".parse().unwrap(), ElevatorSnapshot::default());
/// fleet.insert("10.0.0.2".parse().unwrap(), far);
///
/// let call = Event { event_type: EventType::ButtonCallUp, floor: 1 };
/// let best = find_most_suitable(&call, &fleet, WrongDirectionPolicy::TreatAsIdle);
/// assert_eq!(best, Some("10.0.0.1".parse().unwrap()));
/// ```
pub fn find_most_suitable(event: &Event, fleet: &FleetSnapshot, policy: WrongDirectionPolicy) -> Option<PeerId> {
    let wanted_dir = event.call_dir()?;
    if !event.is_valid() {
        return None;
    }
    let target = event.floor as usize;

    let mut best: Option<(PeerId, u32)> = None;
    for (peer, elev) in fleet.iter() {
        let already_assigned = match wanted_dir {
            Dirn::Up => elev.upruns[target].is_pending(),
            _ => elev.downruns[target].is_pending(),
        };
        if already_assigned {
            return None;
        }

        let Some(cost) = cost(elev, wanted_dir, event.floor, policy) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((_, best_cost)) => cost < best_cost || (cost == best_cost && elev.dir == Dirn::Stop),
        };
        if better {
            best = Some((*peer, cost));
        }
    }
    best.map(|(peer, _)| peer)
}

/// Travel cost in floors for `elev` to serve a call at `target` going `wanted_dir`.
///
/// `None` if the elevator is ineligible under `policy`.
pub fn cost(elev: &ElevatorSnapshot, wanted_dir: Dirn, target: u8, policy: WrongDirectionPolicy) -> Option<u32> {
    let current = elev.current_floor as i32;
    let target = target as i32;
    let sign = wanted_dir.sign();

    let on_the_way = elev.dir == wanted_dir && sign * current < sign * target;
    if on_the_way || elev.dir == Dirn::Stop {
        return Some(current.abs_diff(target));
    }

    let turn = match furthest_run(elev) {
        Some(floor) => floor as i32,
        None => match policy {
            WrongDirectionPolicy::TreatAsIdle => current,
            WrongDirectionPolicy::Ineligible => return None,
        },
    };
    Some(turn.abs_diff(current) + turn.abs_diff(target))
}

/// The furthest floor with a pending run in the elevator's direction of travel.
///
/// Highest up-run when going up, lowest down-run when going down. `None` when stopped or
/// when nothing is pending that way.
pub fn furthest_run(elev: &ElevatorSnapshot) -> Option<usize> {
    match elev.dir {
        Dirn::Up => (0..config::N_FLOORS).rev().find(|&f| elev.upruns[f].is_pending()),
        Dirn::Down => (0..config::N_FLOORS).find(|&f| elev.downruns[f].is_pending()),
        Dirn::Stop => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::CallState;
    use crate::message::EventType;

    fn peer(last: u8) -> PeerId {
        format!("10.100.23.{}", last).parse().unwrap()
    }

    fn elev(floor: u8, dir: Dirn) -> ElevatorSnapshot {
        ElevatorSnapshot { current_floor: floor, dir, ..Default::default() }
    }

    fn up(floor: u8) -> Event {
        Event { event_type: EventType::ButtonCallUp, floor }
    }

    fn down(floor: u8) -> Event {
        Event { event_type: EventType::ButtonCallDown, floor }
    }

    const IDLE: WrongDirectionPolicy = WrongDirectionPolicy::TreatAsIdle;

    #[test]
    fn closest_idle_elevator_wins() {
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), elev(0, Dirn::Stop));
        fleet.insert(peer(2), elev(3, Dirn::Stop));
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), Some(peer(1)));
        assert_eq!(find_most_suitable(&down(3), &fleet, IDLE), Some(peer(2)));
    }

    #[test]
    fn pending_run_anywhere_suppresses_the_call() {
        let mut a = elev(0, Dirn::Up);
        a.upruns[2] = CallState::Call;
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), a);
        fleet.insert(peer(2), elev(3, Dirn::Stop));
        assert_eq!(find_most_suitable(&up(2), &fleet, IDLE), None);

        // Internal states count as pending too
        let mut b = elev(3, Dirn::Stop);
        b.downruns[1] = CallState::Internal(3);
        fleet.insert(peer(2), b);
        assert_eq!(find_most_suitable(&down(1), &fleet, IDLE), None);
        // The other direction at the same floor is still free
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), Some(peer(1)));
    }

    #[test]
    fn suppression_wins_even_after_a_candidate_was_found() {
        let mut late = elev(3, Dirn::Stop);
        late.upruns[1] = CallState::Call;
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), elev(1, Dirn::Stop));
        fleet.insert(peer(9), late);
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), None);
    }

    #[test]
    fn wrong_direction_pays_for_the_turn() {
        let mut a = elev(2, Dirn::Down);
        a.downruns[0] = CallState::Call;
        assert_eq!(cost(&a, Dirn::Up, 3, IDLE), Some(5));

        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), a);
        assert_eq!(find_most_suitable(&up(3), &fleet, IDLE), Some(peer(1)));
    }

    #[test]
    fn moving_past_the_floor_counts_as_wrong_direction() {
        let mut a = elev(2, Dirn::Up);
        a.upruns[3] = CallState::Call;
        // Already above floor 1 going up: up to 3, back down to 1
        assert_eq!(cost(&a, Dirn::Up, 1, IDLE), Some(1 + 2));
        // Below floor 3 going up: on the way
        assert_eq!(cost(&a, Dirn::Up, 3, IDLE), Some(1));
    }

    #[test]
    fn idle_elevator_wins_a_tie_with_a_moving_one() {
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), elev(0, Dirn::Up));
        fleet.insert(peer(2), elev(2, Dirn::Stop));
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), Some(peer(2)));

        // A moving elevator does not take a tie from an idle one listed first
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), elev(2, Dirn::Stop));
        fleet.insert(peer(2), elev(0, Dirn::Up));
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), Some(peer(1)));
    }

    #[test]
    fn ties_between_idle_elevators_are_deterministic() {
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(5), elev(0, Dirn::Stop));
        fleet.insert(peer(3), elev(2, Dirn::Stop));
        let first = find_most_suitable(&up(1), &fleet, IDLE);
        for _ in 0..10 {
            assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), first);
        }
        // The later of two equally good idle elevators takes the tie
        assert_eq!(first, Some(peer(5)));
    }

    #[test]
    fn no_runs_in_direction_follows_policy() {
        let a = elev(3, Dirn::Down);
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), a.clone());

        assert_eq!(cost(&a, Dirn::Up, 1, IDLE), Some(2));
        assert_eq!(find_most_suitable(&up(1), &fleet, IDLE), Some(peer(1)));

        assert_eq!(cost(&a, Dirn::Up, 1, WrongDirectionPolicy::Ineligible), None);
        assert_eq!(find_most_suitable(&up(1), &fleet, WrongDirectionPolicy::Ineligible), None);
    }

    #[test]
    fn non_calls_and_bad_floors_get_no_assignment() {
        let mut fleet = FleetSnapshot::new();
        fleet.insert(peer(1), elev(0, Dirn::Stop));
        let done = Event { event_type: EventType::JobDone, floor: 1 };
        assert_eq!(find_most_suitable(&done, &fleet, IDLE), None);
        assert_eq!(find_most_suitable(&up(config::N_FLOORS as u8), &fleet, IDLE), None);
        assert_eq!(find_most_suitable(&up(1), &FleetSnapshot::new(), IDLE), None);
    }

    #[test]
    fn furthest_run_scans_from_the_far_end() {
        let mut a = elev(1, Dirn::Up);
        a.upruns[2] = CallState::Call;
        a.upruns[3] = CallState::Internal(1);
        assert_eq!(furthest_run(&a), Some(3));

        let mut b = elev(3, Dirn::Down);
        b.downruns[1] = CallState::Call;
        b.downruns[2] = CallState::Call;
        assert_eq!(furthest_run(&b), Some(1));

        assert_eq!(furthest_run(&elev(0, Dirn::Stop)), None);
    }
}
