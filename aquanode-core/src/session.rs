//! Host Session Liveness
//!
//! The node has no explicit connect/disconnect handshake. It considers a
//! host present while traffic keeps arriving and falls back to announcing
//! itself when the line goes quiet:
//!
//! ```text
//!                 any typed message
//!   ┌──────────────┐ ───────────────▶ ┌───────────┐
//!   │ Disconnected │                  │ Connected │ ◀─┐ any typed message
//!   └──────────────┘ ◀─────────────── └───────────┘ ──┘ (refreshes liveness)
//!     │      ▲      silence > 4000 ms
//!     └──────┘
//!   hello every 1200 ms
//! ```
//!
//! Sending an announcement never changes state; only inbound traffic does.
//! Demotion re-arms the announce timer, so the first announcement after a
//! host goes quiet comes one full interval later.

use crate::constants::time::{ANNOUNCE_INTERVAL_MS, LIVENESS_TIMEOUT_MS};
use crate::time::{elapsed_ms, has_elapsed, Millis};

/// Outcome of a periodic session check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTick {
    /// Nothing to do
    Idle,
    /// The host went quiet; the session is now disconnected
    Lost,
    /// Disconnected and the announce timer fired; send a `hello`
    Announce,
}

/// Connection liveness plus the two session timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    connected: bool,
    last_announce_at: Millis,
    last_liveness_at: Millis,
    announce_interval_ms: u32,
    liveness_timeout_ms: u32,
}

impl SessionState {
    /// Disconnected session with explicit timers
    pub const fn new(announce_interval_ms: u32, liveness_timeout_ms: u32) -> Self {
        Self {
            connected: false,
            last_announce_at: 0,
            last_liveness_at: 0,
            announce_interval_ms,
            liveness_timeout_ms,
        }
    }

    /// Whether a host is currently considered present
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Counter value of the last inbound traffic
    pub fn last_liveness_at(&self) -> Millis {
        self.last_liveness_at
    }

    /// Counter value the announce timer was last armed at
    pub fn last_announce_at(&self) -> Millis {
        self.last_announce_at
    }

    /// Record inbound traffic: connect (or stay connected) and refresh liveness
    pub fn mark_alive(&mut self, now: Millis) {
        if !self.connected {
            log_info!("host connected at {} ms", now);
        }
        self.connected = true;
        self.last_liveness_at = now;
    }

    /// Periodic check: demote on silence, announce while disconnected
    pub fn tick(&mut self, now: Millis) -> SessionTick {
        if self.connected {
            if elapsed_ms(now, self.last_liveness_at) > self.liveness_timeout_ms {
                self.connected = false;
                self.last_announce_at = now;
                log_warn!(
                    "host silent for {} ms, session dropped",
                    elapsed_ms(now, self.last_liveness_at)
                );
                return SessionTick::Lost;
            }
            return SessionTick::Idle;
        }

        if has_elapsed(now, self.last_announce_at, self.announce_interval_ms) {
            self.last_announce_at = now;
            return SessionTick::Announce;
        }
        SessionTick::Idle
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(ANNOUNCE_INTERVAL_MS, LIVENESS_TIMEOUT_MS)
    }
}
