//! # Master event loop
//!
//! [MasterState] is everything the master knows: the live fleet, the orphan left behind when the
//! whole fleet dropped, and the backup slot. It is shared as a [SharedMaster] between the event
//! loop ([run_master]) and the single settle task ([crate::backup::reconcile_after_settle]), so
//! their critical sections never interleave.
//!
//! Every transition takes one [NetEvent] and may send messages to peers. Sends only queue the
//! message on the session (see [PeerLink]), so they are done while holding the guard.
//!
//! ## Sub-modules
//! - [lights]: lamp state for a joining peer, and queue numbers.

pub mod lights;
#[cfg(test)]
pub(crate) mod test_link;

use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::backup::{BackupSlot, Reconciliation};
use crate::config::{MasterConfig, QueueNumbering};
use crate::fleet::registry::FleetRegistry;
use crate::fleet::ElevatorSnapshot;
use crate::ip_help_functions::peer_id;
use crate::manager::dispatcher::{self, WrongDirectionPolicy};
use crate::manager::redistribute::{self, Dispatch};
use crate::message::{Event, EventType, Inbound, Message, Outbound};
use crate::network::{NetEvent, PeerLink};
use crate::print;

/// The master state behind its one guard.
pub type SharedMaster<L> = Arc<Mutex<MasterState<L>>>;

/// Fleet, orphan and backup, plus the policies the master runs with.
#[derive(Debug)]
pub struct MasterState<L> {
    registry: FleetRegistry<L>,
    orphan: Option<ElevatorSnapshot>,
    backup: BackupSlot,
    no_run_policy: WrongDirectionPolicy,
    queue_numbering: QueueNumbering,
}

impl<L> Default for MasterState<L> {
    fn default() -> Self {
        Self {
            registry: Default::default(),
            orphan: None,
            backup: BackupSlot::new(),
            no_run_policy: WrongDirectionPolicy::TreatAsIdle,
            queue_numbering: QueueNumbering::JoinAtEnd,
        }
    }
}

impl<L: PeerLink> MasterState<L> {
    /// Empty master with the given policies.
    pub fn new(no_run_policy: WrongDirectionPolicy, queue_numbering: QueueNumbering) -> Self {
        Self {
            no_run_policy,
            queue_numbering,
            ..Default::default()
        }
    }

    /// Empty master with the policies from `config`.
    pub fn from_config(config: &MasterConfig) -> Self {
        Self::new(config.no_run_policy, config.queue_numbering)
    }

    /// The live fleet.
    pub fn registry(&self) -> &FleetRegistry<L> {
        &self.registry
    }

    /// Snapshot stashed when the last peer dropped, waiting for someone to rejoin.
    pub fn orphan(&self) -> Option<&ElevatorSnapshot> {
        self.orphan.as_ref()
    }

    /// The backup slot.
    pub fn backup(&self) -> &BackupSlot {
        &self.backup
    }

    /// Performs the transition for one event from the transport.
    ///
    /// ## Returns
    /// One [Dispatch] per hall call the transition dispatched, real or synthetic.
    pub fn handle(&mut self, event: NetEvent<L>) -> Vec<Dispatch> {
        match event {
            NetEvent::NewConnection(link) => self.on_new_connection(link),
            NetEvent::LostConnection(link) => self.on_lost_connection(&link),
            NetEvent::Message(msg) => self.on_message(msg),
        }
    }

    /// Registers the peer with a zeroed snapshot, gives it a queue number and the fleet's lamp
    /// state, then hands it any stashed orphan.
    fn on_new_connection(&mut self, link: L) -> Vec<Dispatch> {
        let peer = peer_id(link.peer_addr());
        if self.registry.add(peer, ElevatorSnapshot::default(), link.clone()).is_some() {
            print::info(format!("{} reconnected, replacing its old session", peer));
        }
        print::master(format!("{} joined, fleet size {}", peer, self.registry.size()));

        match self.queue_numbering {
            QueueNumbering::JoinAtEnd => {
                Self::send_to(&link, &Outbound::QueueNumber(self.registry.size() as u32));
            }
            QueueNumbering::RenumberAll => self.renumber(),
        }

        let lights = lights::mirror_lights(self.registry.iterate().map(|(_, elev)| elev));
        for light in lights {
            Self::send_to(&link, &Outbound::Event(light));
        }

        match self.orphan.take() {
            Some(orphan) => {
                print::master(format!("Handing the orphaned calls to {}", peer));
                self.redistribute(&orphan)
            }
            None => Vec::new(),
        }
    }

    /// Drops the peer and hands on its calls. The last peer out leaves its snapshot as orphan.
    fn on_lost_connection(&mut self, link: &L) -> Vec<Dispatch> {
        let peer = peer_id(link.peer_addr());
        if !self.registry.is_bound_to(&peer, link.session_id()) {
            // Superseded session, the peer is already back
            print::info(format!("Ignoring loss of old session {} from {}", link.session_id(), peer));
            return Vec::new();
        }
        let Some(lost) = self.registry.remove(&peer) else {
            return Vec::new();
        };
        print::warn(format!("Lost connection to {}, fleet size {}", peer, self.registry.size()));

        if self.registry.is_empty() {
            print::warn("Fleet is empty, keeping the lost calls until someone joins".to_string());
            self.orphan = Some(lost);
            return Vec::new();
        }

        let dispatches = self.redistribute(&lost);
        self.renumber();
        dispatches
    }

    fn on_message(&mut self, msg: Message<L>) -> Vec<Dispatch> {
        let peer = peer_id(msg.sender.peer_addr());
        let inbound = match Inbound::decode(&msg.payload) {
            Ok(inbound) => inbound,
            Err(e) => {
                print::err(format!("Dropping message from {}: {}", peer, e));
                return Vec::new();
            }
        };

        match inbound {
            Inbound::Handshake => Vec::new(),
            Inbound::Event(event) => match event.event_type {
                EventType::ButtonCallUp | EventType::ButtonCallDown => vec![self.assign_hall_call(event)],
                EventType::JobDone => {
                    self.broadcast(&Outbound::Event(Event::lights_off(event.floor)));
                    Vec::new()
                }
                other => {
                    print::warn(format!("{} sent {:?}, which only the master sends", peer, other));
                    Vec::new()
                }
            },
            Inbound::ElevInfo(elev) => {
                let superseded = self.registry.link(&peer)
                    .map_or(false, |bound| bound.session_id() != msg.sender.session_id());
                if superseded {
                    // Late frame from a session the peer already replaced
                    print::info(format!("Dropping state from old session {} of {}", msg.sender.session_id(), peer));
                    return Vec::new();
                }
                self.registry.update(peer, elev, msg.sender);
                let fleet = self.registry.fleet_snapshot();
                self.broadcast(&Outbound::Backup(fleet.clone()));
                print::fleet(&fleet);
                Vec::new()
            }
            Inbound::Backup(fleet) => {
                if self.backup.offer(fleet) {
                    print::ok(format!("Accepted backup from {}", peer));
                } else {
                    print::info(format!("Already have a backup, dropping the one from {}", peer));
                }
                Vec::new()
            }
        }
    }

    /// Dispatches a hall call. On assignment the order goes to the chosen peer and the light
    /// goes on everywhere.
    fn assign_hall_call(&self, event: Event) -> Dispatch {
        let fleet = self.registry.fleet_snapshot();
        let assigned = dispatcher::find_most_suitable(&event, &fleet, self.no_run_policy);

        match assigned.and_then(|peer| self.registry.link(&peer).map(|link| (peer, link))) {
            Some((peer, link)) => {
                print::master(format!("{:?} at floor {} goes to {}", event.event_type, event.floor, peer));
                Self::send_to(link, &Outbound::Event(event));
                if let Some(light) = event.call_dir().and_then(|dir| Event::light_on(event.floor, dir)) {
                    self.broadcast(&Outbound::Event(light));
                }
            }
            None => {
                print::warn(format!("No assignment for {:?} at floor {}, dropped", event.event_type, event.floor));
            }
        }
        Dispatch { event, assigned }
    }

    /// Dispatches every `CALL` of a snapshot whose owner is gone.
    fn redistribute(&self, lost: &ElevatorSnapshot) -> Vec<Dispatch> {
        redistribute::orphaned_calls(lost)
            .into_iter()
            .map(|call| self.assign_hall_call(call))
            .collect()
    }

    /// Sends every peer its place in the fleet, 1..=size in peer order.
    fn renumber(&self) {
        for (peer, number) in lights::queue_numbers(self.registry.links().map(|(peer, _)| peer)) {
            if let Some(link) = self.registry.link(&peer) {
                Self::send_to(link, &Outbound::QueueNumber(number));
            }
        }
    }

    /// Compares the received backup with the live fleet and hands on the calls of every peer
    /// that did not come back. Runs once, see [BackupSlot].
    pub fn reconcile_backup(&mut self) -> Option<Reconciliation> {
        let registry = &self.registry;
        let missing = self.backup.take_missing(|peer| registry.lookup(peer).is_some())?;

        let mut outcome = Reconciliation::default();
        for (peer, elev) in missing {
            print::warn(format!("{} did not come back after the master change", peer));
            outcome.lost.push(peer);
            outcome.dispatches.extend(self.redistribute(&elev));
        }
        Some(outcome)
    }

    fn send_to(link: &L, msg: &Outbound) {
        if let Err(e) = link.send(msg) {
            print::err(format!("Failed to send to {}: {}", peer_id(link.peer_addr()), e));
        }
    }

    fn broadcast(&self, msg: &Outbound) {
        for (_, link) in self.registry.links() {
            Self::send_to(link, msg);
        }
    }
}

/// Main loop of the master.
///
/// Drains `net_rx` and runs each event through [MasterState::handle] under the guard.
///
/// ## Errors
/// Returns when the transport drops its end of the queue. The master cannot do anything
/// useful without it.
pub async fn run_master<L: PeerLink>(master: SharedMaster<L>, mut net_rx: mpsc::Receiver<NetEvent<L>>) -> Result<()> {
    while let Some(event) = net_rx.recv().await {
        let mut state = master.lock().await;
        state.handle(event);
    }
    bail!("Transport event queue closed")
}
