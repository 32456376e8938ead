//! # Backup and restore of fleet state
//!
//! After every elevator update the master broadcasts the whole fleet to every slave, so each
//! slave holds the latest [FleetSnapshot]. When a master dies, the slaves reconnect to the new
//! one and push that snapshot back as a `BACKUP`.
//!
//! The new master keeps the first backup it gets ([BackupSlot]). After a settling interval it
//! compares the backup with who actually reconnected ([reconcile_after_settle]): elevators in the
//! backup that are still missing are considered dead, and their hall calls are dispatched to the
//! live fleet.

use tokio::time::{sleep, Duration};

use crate::fleet::{ElevatorSnapshot, FleetSnapshot, PeerId};
use crate::manager::redistribute::Dispatch;
use crate::master::SharedMaster;
use crate::network::PeerLink;
use crate::print;

/// Holds the one backup a master process accepts.
#[derive(Debug, Clone, Default)]
pub struct BackupSlot {
    received: Option<FleetSnapshot>,
    reconciled: bool,
}

impl BackupSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a backup. The first one is kept, later ones are dropped.
    ///
    /// ## Returns
    /// true if `fleet` was accepted.
    pub fn offer(&mut self, fleet: FleetSnapshot) -> bool {
        if self.received.is_some() {
            return false;
        }
        self.received = Some(fleet);
        true
    }

    /// true once a backup has been accepted.
    pub fn received_backup(&self) -> bool {
        self.received.is_some()
    }

    /// The accepted backup, if any.
    pub fn backup(&self) -> Option<&FleetSnapshot> {
        self.received.as_ref()
    }

    /// true once the settling interval is over and the backup (if any) has been reconciled.
    pub fn is_reconciled(&self) -> bool {
        self.reconciled
    }

    /// Peers of the backup missing from the live fleet, with the backup's snapshot of each.
    ///
    /// Closes the settling window, so this only yields once. Returns `None` if there is no backup
    /// or the window is already closed.
    pub(crate) fn take_missing(
        &mut self,
        mut is_live: impl FnMut(&PeerId) -> bool,
    ) -> Option<Vec<(PeerId, ElevatorSnapshot)>> {
        if self.reconciled {
            return None;
        }
        self.reconciled = true;
        let backup = self.received.as_ref()?;
        Some(
            backup.iter()
                .filter(|(peer, _)| !is_live(peer))
                .map(|(peer, elev)| (*peer, elev.clone()))
                .collect(),
        )
    }
}

/// Result of comparing the backup with the live fleet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Peers in the backup that did not reconnect
    pub lost: Vec<PeerId>,
    /// What happened to each of their hall calls
    pub dispatches: Vec<Dispatch>,
}

/// Sleeps `settle`, then reconciles the backup under the master guard.
///
/// ## Returns
/// `None` if no backup arrived during the settling interval.
///
/// ## Note
/// Meant to be spawned once, at master startup.
pub async fn reconcile_after_settle<L: PeerLink>(master: SharedMaster<L>, settle: Duration) -> Option<Reconciliation> {
    print::info(format!("Waiting {:?} for slaves to reconnect with their backup", settle));
    sleep(settle).await;

    let mut state = master.lock().await;
    let outcome = state.reconcile_backup();
    match &outcome {
        None => print::info("No backup received, starting with a fresh fleet".to_string()),
        Some(r) if r.lost.is_empty() => print::ok("Backup reconciled, every elevator came back".to_string()),
        Some(r) => print::warn(format!(
            "Backup reconciled, lost {:?}, redistributed {} call(s)",
            r.lost,
            r.dispatches.len()
        )),
    }
    outcome
}
