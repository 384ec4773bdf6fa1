//! Error Types for the Host Protocol and Calibration Payloads
//!
//! ## Design Philosophy
//!
//! Nothing in the node is fatal. Every error here is either turned into a
//! reply the host can read, or swallowed after logging. The types follow the
//! same rules as the rest of the core:
//!
//! 1. **Copy Semantics**: errors are small and `Copy`, so they can be returned
//!    from hot paths and stashed without moves.
//! 2. **No Heap Allocation**: messages are `&'static str` only.
//! 3. **Actionable Information**: each variant says which channel or field
//!    was at fault.
//!
//! ## Error Categories
//!
//! ### Protocol errors (reported to the host)
//! - `InvalidJson`: the line did not decode; reply `error` / `invalid_json`
//! - `MissingType`: no `t` field; reply `unknown` / `missing_type`
//! - `UnsupportedType`: a `t` the node does not handle; reply
//!   `unknown` / `unsupported_type`
//!
//! ### Calibration errors (never reported)
//! A `set_calib` payload may update one channel and not the other. Parsing a
//! channel yields a [`CalibrationError`]; the dispatcher logs it and keeps
//! the previous curve for that channel.
//!
//! ```rust
//! use aquanode_core::errors::ProtocolError;
//!
//! let err = ProtocolError::UnsupportedType;
//! assert_eq!(err.reply_type(), "unknown");
//! assert_eq!(err.code(), "unsupported_type");
//! ```

use thiserror_no_std::Error;

use crate::constants::protocol::{MSG_INVALID_JSON, MSG_MISSING_TYPE, MSG_UNSUPPORTED_TYPE};

/// Result type for calibration payload parsing
pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Reasons an inbound message could not be dispatched
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line is not a well-formed JSON document
    #[error("Inbound line is not valid JSON")]
    InvalidJson,

    /// Decoded message has no string `t` field
    #[error("Inbound message has no type field")]
    MissingType,

    /// `t` names a message the node does not handle
    #[error("Inbound message type is not supported")]
    UnsupportedType,
}

impl ProtocolError {
    /// Wire code placed in the reply's `msg` field
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson => MSG_INVALID_JSON,
            Self::MissingType => MSG_MISSING_TYPE,
            Self::UnsupportedType => MSG_UNSUPPORTED_TYPE,
        }
    }

    /// Reply `t` the host expects for this failure
    pub const fn reply_type(&self) -> &'static str {
        match self {
            Self::InvalidJson => "error",
            Self::MissingType | Self::UnsupportedType => "unknown",
        }
    }
}

/// Reasons a calibration channel in a `set_calib` payload was skipped
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// Channel is absent or has no `points` array
    #[error("Calibration channel {channel} has no points")]
    MissingPoints {
        /// `"ph"` or `"ec"`
        channel: &'static str,
    },

    /// Fewer points than the curve needs
    #[error("Calibration channel {channel}: need {required} points, have {available}")]
    TooFewPoints {
        /// `"ph"` or `"ec"`
        channel: &'static str,
        /// Points the curve shape needs
        required: usize,
        /// Points the payload carried
        available: usize,
    },

    /// A point lacks a numeric `raw` or `val`
    #[error("Calibration channel {channel}: point {index} is malformed")]
    MalformedPoint {
        /// `"ph"` or `"ec"`
        channel: &'static str,
        /// Position of the bad point
        index: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProtocolError {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.code())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::MissingPoints { channel } =>
                defmt::write!(fmt, "{}: no points", channel),
            Self::TooFewPoints { channel, required, available } =>
                defmt::write!(fmt, "{}: need {} points, have {}", channel, required, available),
            Self::MalformedPoint { channel, index } =>
                defmt::write!(fmt, "{}: point {} malformed", channel, index),
        }
    }
}
