//! Probe Front-End
//!
//! The node core never touches the ADC or the one-wire bus directly. It asks
//! a [`SensorFrontEnd`] for three numbers per sample:
//!
//! - pH probe output, already scaled to volts
//! - EC probe output, already scaled to volts
//! - water temperature in °C, straight from the DS18B20 driver
//!
//! The temperature driver reports bus faults as absurd values (-127 °C for a
//! missing probe). [`plausible_temperature`] swaps NaN and anything outside
//! [`TEMP_PLAUSIBLE_MIN_C`]..[`TEMP_PLAUSIBLE_MAX_C`] (exclusive) for
//! [`TEMP_FALLBACK_C`].

use crate::constants::sensors::{
    ADC_MAX_CODE, ADC_REFERENCE_V, TEMP_FALLBACK_C, TEMP_PLAUSIBLE_MAX_C, TEMP_PLAUSIBLE_MIN_C,
};

/// Raw readings for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    /// pH probe output (volts)
    pub ph_volts: f32,
    /// EC probe output (volts)
    pub ec_volts: f32,
    /// Water temperature (°C), already made plausible
    pub temp_c: f32,
}

/// Hardware (or simulated) probe access
pub trait SensorFrontEnd {
    /// pH probe output in volts
    fn ph_volts(&mut self) -> f32;

    /// EC probe output in volts
    fn ec_volts(&mut self) -> f32;

    /// Water temperature in °C as reported by the driver, faults included
    fn temperature_c(&mut self) -> f32;

    /// One full sample with the temperature made plausible
    fn read(&mut self) -> RawReading {
        RawReading {
            ph_volts: self.ph_volts(),
            ec_volts: self.ec_volts(),
            temp_c: plausible_temperature(self.temperature_c()),
        }
    }
}

/// Convert a 12-bit ADC code to volts against the 3.3 V reference
///
/// Codes above full scale are clamped to full scale.
pub fn adc_to_volts(code: u16) -> f32 {
    let code = code.min(ADC_MAX_CODE);
    f32::from(code) / f32::from(ADC_MAX_CODE) * ADC_REFERENCE_V
}

/// Replace a faulty temperature reading with the fallback value
pub fn plausible_temperature(temp_c: f32) -> f32 {
    if temp_c.is_nan() || temp_c <= TEMP_PLAUSIBLE_MIN_C || temp_c >= TEMP_PLAUSIBLE_MAX_C {
        log_debug!("temperature {} implausible, using {}", temp_c, TEMP_FALLBACK_C);
        return TEMP_FALLBACK_C;
    }
    temp_c
}

/// Front-end returning fixed values; for tests and bench setups
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFrontEnd {
    /// Returned pH probe voltage
    pub ph_volts: f32,
    /// Returned EC probe voltage
    pub ec_volts: f32,
    /// Returned temperature
    pub temp_c: f32,
}

impl FixedFrontEnd {
    /// Front-end that always reports the given values
    pub const fn new(ph_volts: f32, ec_volts: f32, temp_c: f32) -> Self {
        Self {
            ph_volts,
            ec_volts,
            temp_c,
        }
    }
}

impl SensorFrontEnd for FixedFrontEnd {
    fn ph_volts(&mut self) -> f32 {
        self.ph_volts
    }

    fn ec_volts(&mut self) -> f32 {
        self.ec_volts
    }

    fn temperature_c(&mut self) -> f32 {
        self.temp_c
    }
}
