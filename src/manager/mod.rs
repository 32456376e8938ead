//! # Manager
//!
//! Decides who serves what.
//!
//! - [dispatcher]: cost model choosing one elevator per hall call.
//! - [redistribute]: turns the calls of a vanished elevator back into hall calls.

pub mod dispatcher;
pub mod redistribute;
