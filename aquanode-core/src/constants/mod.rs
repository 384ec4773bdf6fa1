//! Constants for the AquaNode core
//!
//! Every timing, sizing and range value the node uses lives here with a
//! short note on where it comes from. [`crate::node::NodeConfig`] takes its
//! defaults from these values.
//!
//! ## Organization
//!
//! - **Time**: sampling, smoothing, debug cadence and host session timers
//! - **Sensors**: ADC geometry, probe ranges and default calibration points
//! - **Protocol**: firmware identity, capability labels and wire codes

/// Time-related constants for sampling, smoothing and session timers.
pub mod time;

/// Sensor front-end geometry, plausibility limits and default calibration.
pub mod sensors;

/// Identity strings and message codes used on the host link.
pub mod protocol;

// Re-export commonly used constants for convenience
pub use time::{
    SAMPLE_INTERVAL_MS, SMOOTHING_WINDOW_MS, DEBUG_ADVANCE_INTERVAL_MS,
    ANNOUNCE_INTERVAL_MS, LIVENESS_TIMEOUT_MS,
};

pub use sensors::{
    SAMPLE_HISTORY_CAPACITY, TEMP_FALLBACK_C, TEMP_PLAUSIBLE_MIN_C, TEMP_PLAUSIBLE_MAX_C,
};

pub use protocol::{FW_VERSION, DEFAULT_FINGERPRINT, MAX_LINE_LEN};
