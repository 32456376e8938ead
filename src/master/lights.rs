//! Fleet-wide outputs derived from the registry: lamp state for a joining peer, and queue numbers.

use crate::config;
use crate::fleet::{Dirn, ElevatorSnapshot, PeerId};
use crate::message::Event;

/// Light-on commands for every `(floor, direction)` that holds a `CALL` anywhere in the fleet.
///
/// One command per pair, even if several elevators hold the same call.
/// Floors ascending, up before down.
pub fn mirror_lights<'a>(fleet: impl IntoIterator<Item = &'a ElevatorSnapshot>) -> Vec<Event> {
    let mut up = [false; config::N_FLOORS];
    let mut down = [false; config::N_FLOORS];
    for elev in fleet {
        for (floor, dir) in elev.calls() {
            match dir {
                Dirn::Up => up[floor as usize] = true,
                Dirn::Down => down[floor as usize] = true,
                Dirn::Stop => {}
            }
        }
    }

    let mut lights = Vec::new();
    for floor in 0..config::N_FLOORS {
        if up[floor] {
            lights.extend(Event::light_on(floor as u8, Dirn::Up));
        }
        if down[floor] {
            lights.extend(Event::light_on(floor as u8, Dirn::Down));
        }
    }
    lights
}

/// Dense queue numbers 1, 2, 3, … in the order the peers are given.
pub fn queue_numbers<'a>(peers: impl IntoIterator<Item = &'a PeerId>) -> Vec<(PeerId, u32)> {
    peers.into_iter()
        .zip(1u32..)
        .map(|(peer, number)| (*peer, number))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::CallState;
    use crate::message::EventType;

    #[test]
    fn shared_calls_light_once() {
        let mut a = ElevatorSnapshot::default();
        a.upruns[1] = CallState::Call;
        let mut b = ElevatorSnapshot::default();
        b.upruns[1] = CallState::Call;
        b.downruns[2] = CallState::Call;
        b.downruns[3] = CallState::Internal(1);

        assert_eq!(
            mirror_lights([&a, &b]),
            vec![
                Event { event_type: EventType::TurnOnUpLight, floor: 1 },
                Event { event_type: EventType::TurnOnDownLight, floor: 2 },
            ]
        );
    }

    #[test]
    fn numbers_start_at_one_without_gaps() {
        let peers: Vec<PeerId> = vec!["10.0.0.4".parse().unwrap(), "10.0.0.9".parse().unwrap()];
        let numbers = queue_numbers(&peers);
        assert_eq!(numbers, vec![(peers[0], 1), (peers[1], 2)]);
        assert!(queue_numbers(&Vec::<PeerId>::new()).is_empty());
    }
}
