#![warn(missing_docs)]
//! # This projects library
//!
//! The master of a small elevator fleet. Slaves find it through a UDP beacon, connect over TCP, and
//! report button presses and their own state. The master assigns hall calls, keeps the call lights
//! in sync across the fleet, and hands every slave a backup of the fleet so a new master can pick
//! up where the last one died.
//!
//! ## Overview
//! - **config**: Constants, print toggles and the runtime [config::MasterConfig].
//! - **ip_help_functions**: Peer identity from a session address, and the local IP.
//! - **init**: Command line parsing.
//! - **print**: Coloured terminal logging and the fleet table.
//! - **fleet**: Domain types, the fleet registry and the wire codec for them.
//! - **message**: Tagged payloads between master and slaves.
//! - **manager**: The hall call dispatcher and job redistribution for lost elevators.
//! - **network**: The transport contract, the TCP server and the discovery beacon.
//! - **master**: The event loop owning the fleet.
//! - **backup**: Accepting a backup at startup and reconciling it after the settling interval.

pub mod config;

pub mod ip_help_functions;

pub mod init;

pub mod print;

pub mod fleet;

pub mod message;

pub mod manager;

pub mod network;

pub mod master;

pub mod backup;
