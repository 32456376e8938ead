//! Serialization and Deserialization for [ElevatorSnapshot], [FleetSnapshot] and [Event]
//!
//! Uses `bincode` for the message bodies. Decoders validate floors, so the rest of the
//! master can index run arrays without checking again.

use anyhow::{bail, Context, Result};

use crate::fleet::{ElevatorSnapshot, FleetSnapshot};
use crate::message::Event;

/// Serializes an `ElevatorSnapshot` into a binary format.
pub fn serialize_elevator(elev: &ElevatorSnapshot) -> Result<Vec<u8>> {
    bincode::serialize(elev).context("Serialization of elevator snapshot failed")
}

/// Deserializes an `ElevatorSnapshot`, rejecting floors outside the building.
pub fn deserialize_elevator(data: &[u8]) -> Result<ElevatorSnapshot> {
    let elev: ElevatorSnapshot = bincode::deserialize(data)
        .context("Deserialization of elevator snapshot failed")?;
    if !elev.is_valid() {
        bail!("Elevator snapshot reports floor {}", elev.current_floor);
    }
    Ok(elev)
}

/// Serializes a `FleetSnapshot` into a binary format.
pub fn serialize_fleet(fleet: &FleetSnapshot) -> Result<Vec<u8>> {
    bincode::serialize(fleet).context("Serialization of fleet snapshot failed")
}

/// Deserializes a `FleetSnapshot`. One bad entry rejects the whole snapshot.
pub fn deserialize_fleet(data: &[u8]) -> Result<FleetSnapshot> {
    let fleet: FleetSnapshot = bincode::deserialize(data)
        .context("Deserialization of fleet snapshot failed")?;
    if let Some((peer, elev)) = fleet.iter().find(|(_, e)| !e.is_valid()) {
        bail!("Fleet snapshot entry {} reports floor {}", peer, elev.current_floor);
    }
    Ok(fleet)
}

/// Serializes an `Event` into a binary format.
pub fn serialize_event(event: &Event) -> Result<Vec<u8>> {
    bincode::serialize(event).context("Serialization of event failed")
}

/// Deserializes an `Event`, rejecting floors outside the building.
pub fn deserialize_event(data: &[u8]) -> Result<Event> {
    let event: Event = bincode::deserialize(data)
        .context("Deserialization of event failed")?;
    if !event.is_valid() {
        bail!("Event {:?} at floor {}", event.event_type, event.floor);
    }
    Ok(event)
}

/// Serializes a queue number.
pub fn serialize_queue_number(number: u32) -> Result<Vec<u8>> {
    bincode::serialize(&number).context("Serialization of queue number failed")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::{CallState, Dirn};
    use crate::message::EventType;

    #[test]
    fn fleet_keeps_runs_through_the_wire() {
        let mut elev = ElevatorSnapshot::default();
        elev.current_floor = 3;
        elev.dir = Dirn::Down;
        elev.downruns[1] = CallState::Call;
        elev.upruns[0] = CallState::Internal(9);
        let mut fleet = FleetSnapshot::new();
        fleet.insert("10.100.23.20".parse().unwrap(), elev);

        let bytes = serialize_fleet(&fleet).unwrap();
        assert_eq!(deserialize_fleet(&bytes).unwrap(), fleet);
    }

    #[test]
    fn snapshot_with_floor_out_of_range_is_rejected() {
        let mut elev = ElevatorSnapshot::default();
        elev.current_floor = 200;
        let bytes = bincode::serialize(&elev).unwrap();
        assert!(deserialize_elevator(&bytes).is_err());
    }

    #[test]
    fn truncated_body_is_rejected() {
        let event = Event { event_type: EventType::ButtonCallUp, floor: 1 };
        let bytes = serialize_event(&event).unwrap();
        assert!(deserialize_event(&bytes[..bytes.len() - 1]).is_err());
    }
}
