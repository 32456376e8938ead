//! # config.rs – Centralized Parameter Store
//!
//! This module holds all static program parameters used by the master.
//! Runtime overrides (ports, settle time, dispatcher policies) are collected in [MasterConfig],
//! which is built from the command line by [crate::init::parse_args].

use std::sync::Mutex;
use std::time::Duration;
use once_cell::sync::Lazy;

use crate::manager::dispatcher::WrongDirectionPolicy;

//
// ──────────────────────────────────────────────────────────────
//   1. NETWORK SETTINGS
// ──────────────────────────────────────────────────────────────
//

/// Port the master accepts slave TCP sessions on
pub const MASTER_PORT: u16 = 10002;

/// Address the TCP listener binds to
pub static LISTEN_ADDR: &str = "0.0.0.0";

/// Broadcast address used for master discovery
pub static BC_ADDR: &str = "255.255.255.255";

/// Port the slaves listen for the discovery beacon on
pub const BROADCAST_PORT: u16 = 10001;

/// Broadcast key used by slaves to filter out foreign beacons
pub const KEY_STR: &str = "Gruppe 25";

/// Largest frame payload accepted on a TCP session (length prefix is a `u16`)
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

//
// ──────────────────────────────────────────────────────────────
//   2. SYSTEM & ELEVATOR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// Number of floors served by every elevator in the fleet
pub const N_FLOORS: usize = 4;

//
// ──────────────────────────────────────────────────────────────
//   3. WIRE TAGS
// ──────────────────────────────────────────────────────────────
//

/// Slave greets the master. Empty body
pub const TAG_HANDSHAKE: u8 = 0;

/// An [crate::message::Event], both directions
pub const TAG_EVENT: u8 = 1;

/// A full [crate::fleet::ElevatorSnapshot] pushed by a slave
pub const TAG_ELEV_INFO: u8 = 2;

/// A full [crate::fleet::FleetSnapshot], both directions
pub const TAG_BACKUP: u8 = 3;

/// Queue number from master to slave
pub const TAG_QUEUE_NUMBER: u8 = 4;

//
// ──────────────────────────────────────────────────────────────
//   4. TIMING & TIMEOUTS & INTERVALS
// ──────────────────────────────────────────────────────────────
//

/// Time a fresh master waits for slaves to reconnect and push their backup
pub const SETTLE_PERIOD: Duration = Duration::from_millis(2000);

/// Time between discovery beacons
pub const BEACON_PERIOD: Duration = Duration::from_millis(500);

/// Pause before accepting again after the listener failed (e.g. out of file descriptors)
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Capacity of the queue carrying transport events to the master loop
pub const NET_EVENT_QUEUE: usize = 100;

//
// ──────────────────────────────────────────────────────────────
//   5. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of the fleet table after every update
pub static PRINT_FLEET_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Print the fleet as JSON instead of a table
pub static FLEET_AS_JSON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable master specific prints (dispatch decisions, membership)
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Reads one of the print toggles above. A poisoned toggle counts as enabled.
pub fn print_enabled(flag: &Lazy<Mutex<bool>>) -> bool {
    flag.lock().map(|on| *on).unwrap_or(true)
}

/// Sets one of the print toggles above.
pub fn set_print(flag: &Lazy<Mutex<bool>>, on: bool) {
    if let Ok(mut guard) = flag.lock() {
        *guard = on;
    }
}


/// How a freshly joined peer is given its queue number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueNumbering {
    /// The joining peer gets the fleet size, the rest keep their numbers
    JoinAtEnd,
    /// Every membership change renumbers the whole fleet 1..=N
    RenumberAll,
}

/// Runtime settings for one master process
#[derive(Debug, Clone)]
pub struct MasterConfig {
    /// TCP port slaves connect to
    pub port: u16,
    /// Destination of the discovery beacon, `ip:port`
    pub beacon_addr: String,
    /// Time between beacons
    pub beacon_period: Duration,
    /// Settling interval before the received backup is reconciled
    pub settle: Duration,
    /// Read watchdog on slave sessions. `None` disables it
    pub tcp_timeout: Option<Duration>,
    /// Dispatcher behaviour for moving elevators without pending runs
    pub no_run_policy: WrongDirectionPolicy,
    /// Queue numbering on new connections
    pub queue_numbering: QueueNumbering,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            port: MASTER_PORT,
            beacon_addr: format!("{}:{}", BC_ADDR, BROADCAST_PORT),
            beacon_period: BEACON_PERIOD,
            settle: SETTLE_PERIOD,
            tcp_timeout: None,
            no_run_policy: WrongDirectionPolicy::TreatAsIdle,
            queue_numbering: QueueNumbering::JoinAtEnd,
        }
    }
}
