//! Core logic for the AquaNode water-quality sensor node
//!
//! Turns raw pH / conductivity probe voltages and temperature readings into
//! calibrated values, smooths them over a time window and answers a host over
//! a line-oriented JSON command channel.
//!
//! Everything here is transport agnostic. The caller hands in a decoded
//! message plus the raw line it came from and gets back a [`protocol::Response`]
//! to serialize. A periodic [`node::Node::tick`] drives sampling, the debug
//! value generator and host liveness tracking.
//!
//! Key constraints:
//! - Runs on an RP2040 class MCU (264KB RAM)
//! - Fixed-size sample history, no growth after boot
//! - All elapsed-time math wraps with the 32-bit millisecond counter
//!
//! ```no_run
//! use aquanode_core::node::Node;
//! use aquanode_core::protocol::Inbound;
//! use aquanode_core::debug::XorShift32;
//! use aquanode_core::sensors::FixedFrontEnd;
//!
//! let mut node = Node::new(FixedFrontEnd::new(1.65, 1.65, 21.0), XorShift32::new(7));
//!
//! let line = r#"{"t":"hello"}"#;
//! let value: serde_json::Value = serde_json::from_str(line).unwrap();
//! if let Some(reply) = node.handle(Inbound::decoded(line, &value), 1000) {
//!     // serialize and write `reply` to the host
//! }
//! if let Some(announce) = node.tick(2400) {
//!     // unsolicited hello while no host is listening
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Macros for optional logging
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod aggregator;
pub mod buffer;
pub mod calibration;
pub mod constants;
pub mod debug;
pub mod errors;
pub mod node;
pub mod protocol;
pub mod sensors;
pub mod session;
pub mod time;

// Public API
pub use aggregator::{Sample, SampleAggregator, SmoothedReading};
pub use calibration::{CalibrationPoint, CalibrationState, EcCurve, PhCurve};
pub use errors::{CalibrationError, ProtocolError};
pub use node::{Mode, Node, NodeConfig};
pub use protocol::{Command, Inbound, Response};
pub use session::{SessionState, SessionTick};
pub use time::{Millis, TimeSource};

/// Crate version, independent of the firmware string reported to the host
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
