//! Time-Related Constants
//!
//! All intervals are in milliseconds of the node's 32-bit monotonic counter.
//! Comparisons against these values must go through
//! [`crate::time::elapsed_ms`] so they survive the counter rolling over
//! (roughly every 49.7 days).

// ===== SAMPLING =====

/// Minimum spacing between two probe samples (milliseconds).
///
/// 4 Hz keeps the 64-slot history covering the whole smoothing window
/// (64 × 250 ms = 16 s) while leaving the one-wire bus idle most of the time.
pub const SAMPLE_INTERVAL_MS: u32 = 250;

/// Width of the smoothing window (milliseconds).
///
/// Samples older than this are ignored by the averaged reading. The boundary
/// is inclusive: a sample exactly this old still counts.
pub const SMOOTHING_WINDOW_MS: u32 = 10_000;

/// Cadence of the synthetic debug generator (milliseconds).
///
/// Slow enough that a dashboard polling every second shows each value for
/// several refreshes.
pub const DEBUG_ADVANCE_INTERVAL_MS: u32 = 5_000;

// ===== HOST SESSION =====

/// Interval between unsolicited `hello` announcements while no host is
/// connected (milliseconds).
pub const ANNOUNCE_INTERVAL_MS: u32 = 1_200;

/// Silence after which a connected host is considered gone (milliseconds).
///
/// The comparison is strict: exactly this much silence still counts as
/// connected, one more millisecond does not.
pub const LIVENESS_TIMEOUT_MS: u32 = 4_000;
