//! Sensor Front-End Constants
//!
//! ADC geometry of the RP2040 board, temperature plausibility limits for the
//! DS18B20 probe and the factory calibration the node boots with.

// ===== ADC =====

/// Full-scale code of the 12-bit ADC.
pub const ADC_MAX_CODE: u16 = 4095;

/// ADC reference voltage (volts).
pub const ADC_REFERENCE_V: f32 = 3.3;

// ===== TEMPERATURE PROBE =====

/// Readings at or below this are treated as a bus fault (°C).
///
/// The DS18B20 driver reports -127 °C for a disconnected probe.
pub const TEMP_PLAUSIBLE_MIN_C: f32 = -100.0;

/// Readings at or above this are treated as a bus fault (°C).
pub const TEMP_PLAUSIBLE_MAX_C: f32 = 150.0;

/// Substitute temperature when the probe reading is implausible (°C).
pub const TEMP_FALLBACK_C: f32 = 22.0;

// ===== HISTORY =====

/// Number of samples kept for smoothing.
pub const SAMPLE_HISTORY_CAPACITY: usize = 64;

// ===== DEFAULT CALIBRATION =====

/// Factory pH curve as `(volts, pH)`: 0 V = pH 0, mid-rail = pH 7,
/// full scale = pH 14.
pub const DEFAULT_PH_POINTS: [(f32, f32); 3] = [(0.0, 0.0), (1.65, 7.0), (3.3, 14.0)];

/// Factory EC curve as `(volts, mS/cm)`.
pub const DEFAULT_EC_POINTS: [(f32, f32); 2] = [(0.0, 0.0), (3.3, 5.0)];

/// Two calibration points closer than this in `raw` are treated as the same
/// point (volts).
pub const CALIBRATION_RAW_EPSILON: f32 = 1e-4;

// ===== DEBUG GENERATOR RANGES =====

/// Synthetic pH sweep, inclusive `(min, max)`.
pub const DEBUG_PH_RANGE: (f32, f32) = (6.0, 6.9);

/// Synthetic EC sweep, inclusive `(min, max)`.
pub const DEBUG_EC_RANGE: (f32, f32) = (1.0, 1.9);

/// Synthetic temperature sweep, inclusive `(min, max)`.
pub const DEBUG_TEMP_RANGE: (f32, f32) = (20.0, 20.9);
