//! # Messages between master and slaves
//!
//! Every frame payload starts with a one byte tag (see the `TAG_*` constants in [config]),
//! followed by a bincode body.
//!
//! - [Inbound]: what a slave can send the master.
//! - [Outbound]: what the master sends a slave.
//! - [Message]: an inbound payload, still encoded, with the session it arrived on.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::fleet::{serial, Dirn, ElevatorSnapshot, FleetSnapshot};

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Kind of [Event]. The last three are only ever sent by the master.
pub enum EventType {
    ButtonCallUp,
    ButtonCallDown,
    JobDone,
    TurnOnUpLight,
    TurnOnDownLight,
    TurnOffLights,
}

/// Something that happened at a floor, or an order/light command about a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// What happened
    pub event_type: EventType,
    /// Where
    pub floor: u8,
}

impl Event {
    /// A hall call at `floor` in `dir`. `None` for [Dirn::Stop].
    pub fn hall_call(floor: u8, dir: Dirn) -> Option<Event> {
        let event_type = match dir {
            Dirn::Up => EventType::ButtonCallUp,
            Dirn::Down => EventType::ButtonCallDown,
            Dirn::Stop => return None,
        };
        Some(Event { event_type, floor })
    }

    /// The light-on command matching a hall call at `floor` in `dir`. `None` for [Dirn::Stop].
    pub fn light_on(floor: u8, dir: Dirn) -> Option<Event> {
        let event_type = match dir {
            Dirn::Up => EventType::TurnOnUpLight,
            Dirn::Down => EventType::TurnOnDownLight,
            Dirn::Stop => return None,
        };
        Some(Event { event_type, floor })
    }

    /// Lights off at `floor`, both directions.
    pub fn lights_off(floor: u8) -> Event {
        Event { event_type: EventType::TurnOffLights, floor }
    }

    /// Requested direction if this is a hall call.
    pub fn call_dir(&self) -> Option<Dirn> {
        match self.event_type {
            EventType::ButtonCallUp => Some(Dirn::Up),
            EventType::ButtonCallDown => Some(Dirn::Down),
            _ => None,
        }
    }

    /// Checks that the floor exists in this building.
    pub fn is_valid(&self) -> bool {
        (self.floor as usize) < config::N_FLOORS
    }
}


/// A decoded payload from a slave.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Greeting, nothing to do
    Handshake,
    /// Button press or finished job
    Event(Event),
    /// The sender's full state
    ElevInfo(ElevatorSnapshot),
    /// Fleet snapshot a slave got from the previous master
    Backup(FleetSnapshot),
}

impl Inbound {
    /// Decodes a tagged payload.
    ///
    /// ## Errors
    /// Empty payload, unknown tag, or a body that does not decode (see [serial]).
    pub fn decode(payload: &[u8]) -> Result<Inbound> {
        let (tag, body) = payload
            .split_first()
            .ok_or_else(|| anyhow!("Empty payload"))?;
        match *tag {
            config::TAG_HANDSHAKE => Ok(Inbound::Handshake),
            config::TAG_EVENT => Ok(Inbound::Event(serial::deserialize_event(body)?)),
            config::TAG_ELEV_INFO => Ok(Inbound::ElevInfo(serial::deserialize_elevator(body)?)),
            config::TAG_BACKUP => Ok(Inbound::Backup(serial::deserialize_fleet(body)?)),
            other => bail!("Unknown message tag {}", other),
        }
    }

    /// Encodes the payload the way a slave would. Used by tests and tools talking to a master.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let (tag, body) = match self {
            Inbound::Handshake => (config::TAG_HANDSHAKE, Vec::new()),
            Inbound::Event(event) => (config::TAG_EVENT, serial::serialize_event(event)?),
            Inbound::ElevInfo(elev) => (config::TAG_ELEV_INFO, serial::serialize_elevator(elev)?),
            Inbound::Backup(fleet) => (config::TAG_BACKUP, serial::serialize_fleet(fleet)?),
        };
        Ok(tagged(tag, body))
    }
}

/// A message from the master to one slave.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Job order or light command
    Event(Event),
    /// The slave's position in the fleet
    QueueNumber(u32),
    /// The whole fleet, for the slave to keep in case the master dies
    Backup(FleetSnapshot),
}

impl Outbound {
    /// Encodes as tag byte + bincode body.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let (tag, body) = match self {
            Outbound::Event(event) => (config::TAG_EVENT, serial::serialize_event(event)?),
            Outbound::QueueNumber(n) => (config::TAG_QUEUE_NUMBER, serial::serialize_queue_number(*n)?),
            Outbound::Backup(fleet) => (config::TAG_BACKUP, serial::serialize_fleet(fleet)?),
        };
        Ok(tagged(tag, body))
    }
}

fn tagged(tag: u8, body: Vec<u8>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(body.len() + 1);
    payload.push(tag);
    payload.extend(body);
    payload
}

/// An inbound payload and the session it arrived on.
#[derive(Debug, Clone)]
pub struct Message<L> {
    /// The session that sent the payload
    pub sender: L,
    /// Tag byte followed by the body, not yet decoded
    pub payload: Vec<u8>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::CallState;

    #[test]
    fn hall_call_and_light_follow_direction() {
        let up = Event::hall_call(2, Dirn::Up).unwrap();
        assert_eq!(up.event_type, EventType::ButtonCallUp);
        assert_eq!(up.call_dir(), Some(Dirn::Up));
        assert_eq!(Event::light_on(2, Dirn::Down).unwrap().event_type, EventType::TurnOnDownLight);
        assert!(Event::hall_call(2, Dirn::Stop).is_none());
        assert_eq!(Event::lights_off(3).call_dir(), None);
    }

    #[test]
    fn slave_payloads_decode_to_the_same_value() {
        let mut elev = ElevatorSnapshot::default();
        elev.current_floor = 2;
        elev.dir = Dirn::Up;
        elev.upruns[3] = CallState::Call;

        for inbound in [
            Inbound::Handshake,
            Inbound::Event(Event { event_type: EventType::JobDone, floor: 1 }),
            Inbound::ElevInfo(elev),
        ] {
            let payload = inbound.encode().unwrap();
            assert_eq!(Inbound::decode(&payload).unwrap(), inbound);
        }
    }

    #[test]
    fn unknown_tag_and_empty_payload_are_errors() {
        assert!(Inbound::decode(&[]).is_err());
        assert!(Inbound::decode(&[config::TAG_QUEUE_NUMBER, 1, 0, 0, 0]).is_err());
        assert!(Inbound::decode(&[250]).is_err());
    }

    #[test]
    fn event_for_missing_floor_is_rejected() {
        let payload = Inbound::Event(Event { event_type: EventType::ButtonCallUp, floor: 9 })
            .encode()
            .unwrap();
        assert!(Inbound::decode(&payload).is_err());
    }

    #[test]
    fn outbound_starts_with_its_tag() {
        assert_eq!(Outbound::QueueNumber(3).encode().unwrap(), vec![config::TAG_QUEUE_NUMBER, 3, 0, 0, 0]);
        let payload = Outbound::Event(Event::lights_off(0)).encode().unwrap();
        assert_eq!(payload[0], config::TAG_EVENT);
    }
}
