//! Host Protocol Messages
//!
//! ## Wire Format
//!
//! The host and node exchange one JSON object per line. Every object carries
//! a string `t` naming its type. The node echoes the exact inbound line back
//! in the `raw` field of its reply; there are no request ids.
//!
//! | inbound `t`  | fields read                              | reply           |
//! |--------------|------------------------------------------|-----------------|
//! | `hello`      | –                                        | `hello_ack`     |
//! | `hello_ack`  | –                                        | –               |
//! | `get_all`    | –                                        | `all`           |
//! | `set_mode`   | `mode`                                   | –               |
//! | `set_sim`    | `ph`, `ec`, `temp` (numbers, optional)   | –               |
//! | `set_calib`  | `payload.{ph,ec}.points[{raw,val}]`, `payload.calibHash` | `set_calib_ack` |
//! | other        | –                                        | `unknown` / `unsupported_type` |
//!
//! Lines that are not JSON get `error` / `invalid_json`; objects without a
//! string `t` get `unknown` / `missing_type`.
//!
//! ## Decoding Boundary
//!
//! Turning bytes into a [`serde_json::Value`] is the transport's job. This
//! module takes the decoded value (or the fact that decoding failed) through
//! [`Inbound`] and classifies it into a closed [`Command`] enum. Replies are
//! [`Response`] values whose serde representation is the wire format.

use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calibration::{fingerprint, CalibrationPoint, CalibrationUpdate, EcCurve, PhCurve};
use crate::constants::protocol::{EC_PIN_LABEL, FW_VERSION, PH_PIN_LABEL, TEMP_PIN_LABEL};
use crate::debug::SimOverrides;
use crate::errors::{CalibrationError, CalibrationResult, ProtocolError};
use crate::node::Mode;
use crate::time::Millis;

/// One inbound line, decoded or not
#[derive(Debug, Clone, Copy)]
pub struct Inbound<'a> {
    raw: &'a str,
    body: Option<&'a Value>,
}

impl<'a> Inbound<'a> {
    /// Line that decoded to `body`
    pub fn decoded(raw: &'a str, body: &'a Value) -> Self {
        Self {
            raw,
            body: Some(body),
        }
    }

    /// Line that failed to decode
    pub fn undecodable(raw: &'a str) -> Self {
        Self { raw, body: None }
    }

    /// The line as received, for echoing back
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Decoded document, if decoding succeeded
    pub fn body(&self) -> Option<&'a Value> {
        self.body
    }
}

/// Every message kind the node understands, plus a catch-all
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Host greeting; answered with capabilities
    Hello,
    /// Host acknowledging a node announcement
    HelloAck,
    /// Request for current readings
    GetAll,
    /// Switch between probe and synthetic readings
    SetMode(Mode),
    /// Override synthetic values
    SetSim(SimOverrides),
    /// Replace calibration; `None` when the message had no `payload` object
    SetCalib(Option<CalibrationUpdate>),
    /// A typed message the node does not handle, with its type tag
    Unrecognized(String),
}

impl Command {
    /// Classify a decoded document
    ///
    /// Fails only when there is no string `t`. Unknown types are not an
    /// error at this stage: they still count as host traffic.
    pub fn parse(body: &Value) -> Result<Self, ProtocolError> {
        let kind = body
            .get("t")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingType)?;

        let command = match kind {
            "hello" => Self::Hello,
            "hello_ack" => Self::HelloAck,
            "get_all" => Self::GetAll,
            "set_mode" => Self::SetMode(parse_mode(body)),
            "set_sim" => Self::SetSim(parse_sim(body)),
            "set_calib" => Self::SetCalib(
                body.get("payload")
                    .and_then(Value::as_object)
                    .map(parse_calibration),
            ),
            other => Self::Unrecognized(other.to_string()),
        };
        Ok(command)
    }

    /// Wire type tag of this command
    pub fn kind(&self) -> &str {
        match self {
            Self::Hello => "hello",
            Self::HelloAck => "hello_ack",
            Self::GetAll => "get_all",
            Self::SetMode(_) => "set_mode",
            Self::SetSim(_) => "set_sim",
            Self::SetCalib(_) => "set_calib",
            Self::Unrecognized(kind) => kind,
        }
    }
}

/// `mode == "debug"` selects debug; anything else, including no mode, is real
fn parse_mode(body: &Value) -> Mode {
    match body.get("mode").and_then(Value::as_str) {
        Some("debug") => Mode::Debug,
        _ => Mode::Real,
    }
}

/// Numeric `ph` / `ec` / `temp` fields; non-numeric values are ignored
fn parse_sim(body: &Value) -> SimOverrides {
    let number = |key: &str| body.get(key).and_then(Value::as_f64).map(|v| v as f32);
    SimOverrides {
        ph: number("ph"),
        ec: number("ec"),
        temp: number("temp"),
    }
}

/// Build a calibration update from a `set_calib` payload
///
/// Each channel is parsed on its own; a channel that is missing, short or
/// malformed is left out of the update (and so keeps its current curve).
/// The fingerprint is the payload's `calibHash` string if present,
/// otherwise the FNV-1a hash of the payload's compact JSON. Keys keep the
/// order they arrived in, so reordering a payload changes its fingerprint.
pub fn parse_calibration(payload: &Map<String, Value>) -> CalibrationUpdate {
    let ph = match channel_points::<3>(payload, "ph") {
        Ok(points) => Some(PhCurve::new(points)),
        Err(err) => {
            log_debug!("set_calib: keeping pH curve ({})", err);
            None
        }
    };
    let ec = match channel_points::<2>(payload, "ec") {
        Ok(points) => Some(EcCurve::new(points)),
        Err(err) => {
            log_debug!("set_calib: keeping EC curve ({})", err);
            None
        }
    };

    let fingerprint = match payload.get("calibHash").and_then(Value::as_str) {
        Some(hash) => hash.to_string(),
        None => {
            let bytes = serde_json::to_vec(payload).unwrap_or_default();
            fingerprint(&bytes).as_str().to_string()
        }
    };

    CalibrationUpdate { ph, ec, fingerprint }
}

/// First `N` points of `payload[channel].points`
///
/// Extra points beyond `N` are ignored.
fn channel_points<const N: usize>(
    payload: &Map<String, Value>,
    channel: &'static str,
) -> CalibrationResult<[CalibrationPoint; N]> {
    let points = payload
        .get(channel)
        .and_then(|c| c.get("points"))
        .and_then(Value::as_array)
        .ok_or(CalibrationError::MissingPoints { channel })?;

    if points.len() < N {
        return Err(CalibrationError::TooFewPoints {
            channel,
            required: N,
            available: points.len(),
        });
    }

    let mut parsed = [CalibrationPoint::new(0.0, 0.0); N];
    for (index, (slot, point)) in parsed.iter_mut().zip(points).enumerate() {
        *slot = CalibrationPoint::deserialize(point)
            .map_err(|_| CalibrationError::MalformedPoint { channel, index })?;
    }
    Ok(parsed)
}

/// Pin labels advertised in capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pins {
    /// pH input
    pub ph: &'static str,
    /// EC input
    pub ec: &'static str,
    /// Temperature bus
    pub temp: &'static str,
}

/// What the node can do, as advertised in `hello` messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Has a pH channel
    pub ph: bool,
    /// Has an EC channel
    pub ec: bool,
    /// Has a temperature channel
    pub temp: bool,
    /// Supports debug mode
    pub debug: bool,
    /// Accepts `set_calib`
    pub calib: bool,
    /// Pin labels
    pub pins: Pins,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            ph: true,
            ec: true,
            temp: true,
            debug: true,
            calib: true,
            pins: Pins {
                ph: PH_PIN_LABEL,
                ec: EC_PIN_LABEL,
                temp: TEMP_PIN_LABEL,
            },
        }
    }
}

/// Body of `hello` and `hello_ack`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Announcement {
    /// Echoed inbound line, or `"probe"` for unsolicited announcements
    pub raw: String,
    /// Firmware version string
    pub fw: &'static str,
    /// Capabilities
    pub cap: Capabilities,
    /// Fingerprint of the active calibration
    #[serde(rename = "calibHash")]
    pub calib_hash: String,
}

impl Announcement {
    /// Announcement with the node's fixed identity
    pub fn new(raw: impl Into<String>, calib_hash: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            fw: FW_VERSION,
            cap: Capabilities::default(),
            calib_hash: calib_hash.into(),
        }
    }
}

/// Body of an `all` reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllReadings {
    /// Echoed inbound line
    pub raw: String,
    /// Counter value the readings belong to
    pub ts: Millis,
    /// Mode the readings came from
    pub mode: Mode,
    /// Health flags; always `["ok"]` for now
    pub status: [&'static str; 1],
    /// pH
    pub ph: f32,
    /// Conductivity
    pub ec: f32,
    /// Temperature (°C)
    pub temp: f32,
}

/// Every message the node sends
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "t")]
pub enum Response {
    /// Unsolicited announcement while no host is connected
    #[serde(rename = "hello")]
    Hello(Announcement),
    /// Reply to a host `hello`
    #[serde(rename = "hello_ack")]
    HelloAck(Announcement),
    /// Reply to `get_all`
    #[serde(rename = "all")]
    All(AllReadings),
    /// Reply to `set_calib`
    #[serde(rename = "set_calib_ack")]
    SetCalibAck {
        /// Echoed inbound line
        raw: String,
    },
    /// Undecodable line
    #[serde(rename = "error")]
    Error {
        /// Error code
        msg: &'static str,
        /// Echoed inbound line
        raw: String,
    },
    /// Missing or unsupported type
    #[serde(rename = "unknown")]
    Unknown {
        /// Error code
        msg: &'static str,
        /// Echoed inbound line
        raw: String,
    },
}

impl Response {
    /// Reply describing a protocol failure
    pub fn from_error(err: ProtocolError, raw: &str) -> Self {
        let msg = err.code();
        let raw = raw.to_string();
        match err {
            ProtocolError::InvalidJson => Self::Error { msg, raw },
            ProtocolError::MissingType | ProtocolError::UnsupportedType => {
                Self::Unknown { msg, raw }
            }
        }
    }

    /// Wire type tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello(_) => "hello",
            Self::HelloAck(_) => "hello_ack",
            Self::All(_) => "all",
            Self::SetCalibAck { .. } => "set_calib_ack",
            Self::Error { .. } => "error",
            Self::Unknown { .. } => "unknown",
        }
    }

    /// Echoed inbound line
    pub fn raw(&self) -> &str {
        match self {
            Self::Hello(a) | Self::HelloAck(a) => &a.raw,
            Self::All(all) => &all.raw,
            Self::SetCalibAck { raw } | Self::Error { raw, .. } | Self::Unknown { raw, .. } => raw,
        }
    }
}
