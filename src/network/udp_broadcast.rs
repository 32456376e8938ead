//! ## Discovery beacon
//!
//! The master shouts `"<KEY_STR>:<tcp port>"` on UDP broadcast so slaves know where to connect.
//! The beacon never touches the fleet.

use anyhow::{Context, Result};
use socket2::{Domain, Socket, Type};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::{config, print};

/// Payload of one beacon.
pub fn beacon_message(tcp_port: u16) -> String {
    format!("{}:{}", config::KEY_STR, tcp_port)
}

/// Sets up a reusable, non-blocking broadcast socket bound to an ephemeral port.
fn broadcast_socket() -> Result<UdpSocket> {
    let bind_addr: SocketAddr = SocketAddr::from(([0, 0, 0, 0], 0));
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, None).context("Failed to create UDP socket")?;
    socket.set_nonblocking(true)?;
    socket.set_reuse_address(true)?;
    socket.set_broadcast(true)?;
    socket.bind(&bind_addr.into()).context("Failed to bind UDP socket")?;
    Ok(UdpSocket::from_std(socket.into())?)
}

// ### Starter og kjører udp-broadcaster
/// Starts and runs the discovery beacon
///
/// ## Parameters
/// `beacon_addr`: broadcast destination, `ip:port`
/// `period`: time between beacons
/// `tcp_port`: the port slaves should connect to
///
/// ## Behavior
/// Sends [beacon_message] every `period`. A failed send (e.g. cable out) is logged once
/// and retried on the next tick; recovery is logged too.
///
/// ## Note
/// Only returns on a setup error. Should be spawned as its own task.
pub async fn start_udp_broadcaster(beacon_addr: &str, period: Duration, tcp_port: u16) -> Result<()> {
    let broadcast_addr: SocketAddr = beacon_addr
        .parse()
        .with_context(|| format!("Invalid beacon address {}", beacon_addr))?;
    let udp_socket = broadcast_socket()?;
    let message = beacon_message(tcp_port);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sending = true;
    loop {
        ticker.tick().await;
        match udp_socket.send_to(message.as_bytes(), broadcast_addr).await {
            Ok(_) if !sending => {
                print::ok(format!("Beacon to {} is back", broadcast_addr));
                sending = true;
            }
            Ok(_) => {}
            Err(e) if sending => {
                print::warn(format!("Beacon to {} failed: {}", broadcast_addr, e));
                sending = false;
            }
            Err(_) => {}
        }
    }
}
