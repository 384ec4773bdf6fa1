//! Cooperative serial poll loop
//!
//! [`SerialLink`] owns a transport, a framer and the [`Node`]. One call to
//! [`SerialLink::poll`] is one pass of the firmware main loop:
//!
//! 1. Drain the transport into the framer, queueing complete lines
//! 2. Dispatch the oldest queued line, if any, and write its reply
//! 3. Run the node tick and write any announcement
//!
//! The queue holds at most [`MAX_QUEUED_LINES`]. Lines arriving while it is
//! full are discarded and counted in [`LinkStats::lines_dropped`].

use aquanode_core::{
    debug::EntropySource, sensors::SensorFrontEnd, time::Millis, Node, Response,
};
use heapless::Deque;
use serde::Serialize;

use crate::codec::{dispatch_line, encode};
use crate::framer::LineFramer;
use crate::transport::SerialTransport;
use crate::{LinkError, LinkResult};

const READ_CHUNK: usize = 64;

/// Complete lines held for later polls
pub const MAX_QUEUED_LINES: usize = 16;

/// Traffic counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    /// Complete lines taken from the framer
    pub lines_received: u64,
    /// Lines dispatched to the node
    pub lines_handled: u64,
    /// Lines discarded because the queue was full
    pub lines_dropped: u64,
    /// Messages written to the transport
    pub messages_sent: u64,
    /// Bytes written to the transport
    pub bytes_sent: u64,
    /// Unsolicited announcements among `messages_sent`
    pub announcements: u64,
}

/// A node wired to a byte transport
pub struct SerialLink<T, S, E>
where
    T: SerialTransport,
    S: SensorFrontEnd,
    E: EntropySource,
{
    transport: T,
    framer: LineFramer,
    queued: Deque<String, MAX_QUEUED_LINES>,
    node: Node<S, E>,
    stats: LinkStats,
}

impl<T, S, E> SerialLink<T, S, E>
where
    T: SerialTransport,
    LinkError: From<T::Error>,
    S: SensorFrontEnd,
    E: EntropySource,
{
    /// Link driving `node` over `transport`
    pub fn new(transport: T, node: Node<S, E>) -> Self {
        Self {
            transport,
            framer: LineFramer::new(),
            queued: Deque::new(),
            node,
            stats: LinkStats::default(),
        }
    }

    /// One main-loop pass at counter value `now`
    pub fn poll(&mut self, now: Millis) -> LinkResult<()> {
        self.drain_transport()?;

        if let Some(line) = self.queued.pop_front() {
            self.stats.lines_handled += 1;
            if let Some(reply) = dispatch_line(&mut self.node, &line, now) {
                self.write(&reply)?;
            }
        }

        if let Some(announce) = self.node.tick(now) {
            self.stats.announcements += 1;
            self.write(&announce)?;
        }
        Ok(())
    }

    fn drain_transport(&mut self) -> LinkResult<()> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = self.transport.receive(&mut chunk)?;
            if n == 0 {
                return Ok(());
            }
            let queued = &mut self.queued;
            let stats = &mut self.stats;
            self.framer.push_slice(&chunk[..n], |line| {
                stats.lines_received += 1;
                if queued.push_back(line).is_err() {
                    stats.lines_dropped += 1;
                    log::warn!("line queue full ({} lines), discarded", MAX_QUEUED_LINES);
                }
            });
            if n < chunk.len() {
                return Ok(());
            }
        }
    }

    fn write(&mut self, response: &Response) -> LinkResult<()> {
        let bytes = encode(response)?;
        self.transport.send(&bytes)?;
        self.stats.messages_sent += 1;
        self.stats.bytes_sent += bytes.len() as u64;
        log::debug!("sent {}", response.kind());
        Ok(())
    }

    /// Lines received but not yet dispatched
    pub fn queued_lines(&self) -> usize {
        self.queued.len()
    }

    /// Traffic counters
    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Line framer state
    pub fn framer(&self) -> &LineFramer {
        &self.framer
    }

    /// Driven node
    pub fn node(&self) -> &Node<S, E> {
        &self.node
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
