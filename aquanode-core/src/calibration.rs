//! Piecewise-Linear Probe Calibration
//!
//! ## Overview
//!
//! The pH and EC probes produce a voltage that is mapped to engineering
//! units through a handful of control points captured against reference
//! solutions:
//!
//! - **pH**: three points (typically buffers 4, 7 and 10). The middle point is
//!   an anchor: below it the (p1, p2) line applies, above it the (p2, p3)
//!   line. Beyond the outer points the nearest segment's slope continues.
//!   Nothing is clamped; callers that want saturation clamp themselves.
//! - **EC**: two points, one straight line over the whole domain.
//!
//! ```text
//!  pH
//!  14 ┤                    ● p3
//!     │                ╱
//!   7 ┤          ● p2 ╱         (p2,p3) slope continues past p3
//!     │       ╱
//!   0 ┤  ● p1                   (p1,p2) slope continues below p1
//!     └──┴────────┴────────┴── volts
//!        0       1.65     3.3
//! ```
//!
//! Points are used in the order the host sent them. Two points whose `raw`
//! values are within [`CALIBRATION_RAW_EPSILON`] make their segment return
//! the first point's value instead of dividing by (almost) zero.
//!
//! ## Fingerprint
//!
//! The host tags each calibration with a short hash so it can tell whether
//! the node still runs the curve it last pushed. When the host does not
//! send one, the node derives it with 32-bit FNV-1a over the payload bytes.
//! This is change detection, not integrity protection.

use alloc::string::{String, ToString};
use core::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::constants::protocol::DEFAULT_FINGERPRINT;
use crate::constants::sensors::{CALIBRATION_RAW_EPSILON, DEFAULT_EC_POINTS, DEFAULT_PH_POINTS};

/// FNV-1a 32-bit offset basis
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime
const FNV_PRIME: u32 = 16_777_619;

/// Hex rendering of a 32-bit fingerprint (at most 8 digits)
pub type Fingerprint = heapless::String<8>;

/// One control point: probe output and the value it stands for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Probe output in volts
    pub raw: f32,
    /// Engineering value at `raw`
    #[serde(rename = "val")]
    pub value: f32,
}

impl CalibrationPoint {
    /// Point from a `(raw, value)` pair
    pub const fn new(raw: f32, value: f32) -> Self {
        Self { raw, value }
    }
}

/// Straight line through `a` and `b`, evaluated at `x`
///
/// Returns `a.value` when the two points share a `raw` value.
pub fn linear(a: CalibrationPoint, b: CalibrationPoint, x: f32) -> f32 {
    let span = b.raw - a.raw;
    if libm::fabsf(span) < CALIBRATION_RAW_EPSILON {
        return a.value;
    }
    let slope = (b.value - a.value) / span;
    a.value + slope * (x - a.raw)
}

/// Three-point pH curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhCurve {
    points: [CalibrationPoint; 3],
}

impl PhCurve {
    /// Curve through `points`, taken in the given order
    pub const fn new(points: [CalibrationPoint; 3]) -> Self {
        Self { points }
    }

    /// Factory curve: 0 V → 0, 1.65 V → 7, 3.3 V → 14
    pub const fn factory() -> Self {
        let [a, b, c] = DEFAULT_PH_POINTS;
        Self::new([
            CalibrationPoint::new(a.0, a.1),
            CalibrationPoint::new(b.0, b.1),
            CalibrationPoint::new(c.0, c.1),
        ])
    }

    /// Control points in host order
    pub fn points(&self) -> &[CalibrationPoint; 3] {
        &self.points
    }

    /// Map a probe voltage to pH
    pub fn apply(&self, raw: f32) -> f32 {
        let [p1, p2, p3] = self.points;
        if raw <= p2.raw {
            // Covers extrapolation below p1 as well
            linear(p1, p2, raw)
        } else {
            linear(p2, p3, raw)
        }
    }
}

impl Default for PhCurve {
    fn default() -> Self {
        Self::factory()
    }
}

/// Two-point EC curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcCurve {
    points: [CalibrationPoint; 2],
}

impl EcCurve {
    /// Line through `points`
    pub const fn new(points: [CalibrationPoint; 2]) -> Self {
        Self { points }
    }

    /// Factory curve: 0 V → 0, 3.3 V → 5
    pub const fn factory() -> Self {
        let [a, b] = DEFAULT_EC_POINTS;
        Self::new([CalibrationPoint::new(a.0, a.1), CalibrationPoint::new(b.0, b.1)])
    }

    /// Control points in host order
    pub fn points(&self) -> &[CalibrationPoint; 2] {
        &self.points
    }

    /// Map a probe voltage to conductivity
    pub fn apply(&self, raw: f32) -> f32 {
        linear(self.points[0], self.points[1], raw)
    }
}

impl Default for EcCurve {
    fn default() -> Self {
        Self::factory()
    }
}

/// 32-bit FNV-1a over `bytes`
pub fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Lowercase hex FNV-1a fingerprint of `bytes`, without zero padding
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let mut out = Fingerprint::new();
    // Cannot overflow: a u32 is at most 8 hex digits
    let _ = write!(out, "{:x}", fnv1a(bytes));
    out
}

/// A replacement for some or all of the calibration
///
/// Channels left `None` keep their current curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationUpdate {
    /// New pH curve, if the payload carried a complete one
    pub ph: Option<PhCurve>,
    /// New EC curve, if the payload carried a complete one
    pub ec: Option<EcCurve>,
    /// Host-supplied or derived fingerprint
    pub fingerprint: String,
}

/// Curves currently in force plus the fingerprint the host knows them by
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationState {
    ph: Option<PhCurve>,
    ec: Option<EcCurve>,
    fingerprint: String,
}

impl CalibrationState {
    /// Factory calibration tagged `"default"`
    pub fn factory() -> Self {
        Self {
            ph: Some(PhCurve::factory()),
            ec: Some(EcCurve::factory()),
            fingerprint: DEFAULT_FINGERPRINT.to_string(),
        }
    }

    /// State with explicit curves; `None` channels pass raw values through
    pub fn new(ph: Option<PhCurve>, ec: Option<EcCurve>, fingerprint: impl Into<String>) -> Self {
        Self {
            ph,
            ec,
            fingerprint: fingerprint.into(),
        }
    }

    /// Active pH curve
    pub fn ph_curve(&self) -> Option<&PhCurve> {
        self.ph.as_ref()
    }

    /// Active EC curve
    pub fn ec_curve(&self) -> Option<&EcCurve> {
        self.ec.as_ref()
    }

    /// Fingerprint advertised in `hello` messages
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Calibrated pH for a probe voltage
    pub fn apply_ph(&self, raw: f32) -> f32 {
        self.ph.as_ref().map_or(raw, |curve| curve.apply(raw))
    }

    /// Calibrated EC for a probe voltage
    pub fn apply_ec(&self, raw: f32) -> f32 {
        self.ec.as_ref().map_or(raw, |curve| curve.apply(raw))
    }

    /// Swap in the channels the update carries and take its fingerprint
    pub fn apply_update(&mut self, update: CalibrationUpdate) {
        if let Some(ph) = update.ph {
            self.ph = Some(ph);
        }
        if let Some(ec) = update.ec {
            self.ec = Some(ec);
        }
        self.fingerprint = update.fingerprint;
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::factory()
    }
}
