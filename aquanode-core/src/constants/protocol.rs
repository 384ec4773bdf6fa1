//! Host Protocol Constants
//!
//! Identity strings advertised in `hello` messages and the short codes used
//! in `msg` fields of error replies.

/// Firmware version reported in every `hello` / `hello_ack`.
pub const FW_VERSION: &str = "pico-0.1.0";

/// Fingerprint of the factory calibration.
pub const DEFAULT_FINGERPRINT: &str = "default";

/// `raw` value of unsolicited announcements (there is no request to echo).
pub const ANNOUNCE_RAW: &str = "probe";

/// Pin label of the pH probe input (ADC2 / GPIO28).
pub const PH_PIN_LABEL: &str = "adc2";

/// Pin label of the EC probe input (ADC0 / GPIO26).
pub const EC_PIN_LABEL: &str = "adc0";

/// Pin label of the one-wire temperature bus (GPIO17).
pub const TEMP_PIN_LABEL: &str = "gpio17";

/// Longest inbound line accepted before the partial line is dropped (bytes).
pub const MAX_LINE_LEN: usize = 512;

// ===== MESSAGE CODES =====

/// `msg` for a line that is not valid JSON.
pub const MSG_INVALID_JSON: &str = "invalid_json";

/// `msg` for an object without a `t` field.
pub const MSG_MISSING_TYPE: &str = "missing_type";

/// `msg` for a `t` the node does not handle.
pub const MSG_UNSUPPORTED_TYPE: &str = "unsupported_type";
