//! Host-Side Serial Link for the AquaNode Sensor Node
//!
//! ## Overview
//!
//! The node core is transport agnostic: it takes decoded messages and hands
//! back replies. This crate supplies everything between those replies and a
//! byte stream:
//!
//! ```text
//! ┌──────────────┐  bytes  ┌────────────┐  lines  ┌─────────┐  Value  ┌──────────┐
//! │  Transport   │────────▶│ LineFramer │────────▶│  codec  │────────▶│   Node   │
//! │ (user/stdio) │◀────────│            │         │         │◀────────│ (core)   │
//! └──────────────┘  JSON+\n└────────────┘         └─────────┘ Response└──────────┘
//! ```
//!
//! - [`framer`]: bytes to trimmed lines, with the 512-byte overflow reset
//! - [`codec`]: line to `serde_json::Value` (or not), reply to compact JSON
//! - [`link`]: the cooperative poll loop tying a transport to a node
//! - [`sim`]: simulated probes and an entropy adapter for `rand`
//!
//! ## Poll Cadence
//!
//! Each [`link::SerialLink::poll`] drains whatever bytes the transport has,
//! dispatches at most one complete line, then runs the node tick. Lines that
//! arrive faster than the poll rate queue up, up to
//! [`link::MAX_QUEUED_LINES`], and are handled on later polls. Anything
//! beyond that is dropped and counted.
//!
//! ## Example Usage
//!
//! ```no_run
//! use aquanode_core::{debug::XorShift32, sensors::FixedFrontEnd, time::SystemClock, Node, TimeSource};
//! use aquanode_link::{link::SerialLink, transport::ChannelTransport};
//!
//! let node = Node::new(FixedFrontEnd::new(1.65, 1.65, 21.0), XorShift32::new(1));
//! let mut link = SerialLink::new(ChannelTransport::stdio(), node);
//! let clock = SystemClock::new();
//!
//! while !link.transport().is_closed() {
//!     link.poll(clock.now())?;
//!     std::thread::sleep(std::time::Duration::from_millis(10));
//! }
//! # Ok::<(), aquanode_link::LinkError>(())
//! ```

pub mod codec;
pub mod framer;
pub mod link;
pub mod sim;
pub mod transport;

// Re-export common types
pub use framer::LineFramer;
pub use link::{LinkStats, SerialLink};
pub use transport::{ChannelTransport, SerialTransport};

use thiserror::Error;

/// Errors surfaced by the serial link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Transport read or write failed
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reply could not be serialized
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result alias for link operations
pub type LinkResult<T> = Result<T, LinkError>;
