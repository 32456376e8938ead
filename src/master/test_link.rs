//! A [PeerLink] that records what the master sends, for tests.

use anyhow::{bail, Result};
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::fleet::FleetSnapshot;
use crate::message::{Event, Outbound};
use crate::network::PeerLink;

#[derive(Debug, Clone)]
pub struct RecordingLink {
    addr: SocketAddr,
    session_id: u64,
    sent: Arc<Mutex<Vec<Outbound>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingLink {
    pub fn new(ip: IpAddr, session_id: u64) -> Self {
        Self {
            addr: SocketAddr::new(ip, 40000 + session_id as u16),
            session_id,
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.sent().into_iter()
            .filter_map(|m| match m {
                Outbound::Event(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn queue_numbers(&self) -> Vec<u32> {
        self.sent().into_iter()
            .filter_map(|m| match m {
                Outbound::QueueNumber(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn backups(&self) -> Vec<FleetSnapshot> {
        self.sent().into_iter()
            .filter_map(|m| match m {
                Outbound::Backup(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl PeerLink for RecordingLink {
    fn session_id(&self) -> u64 {
        self.session_id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    fn send(&self, msg: &Outbound) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            bail!("closed");
        }
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }
}
