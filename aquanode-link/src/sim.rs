//! Simulated probes for bench runs without hardware
//!
//! [`SimulatedFrontEnd`] produces the voltages a real probe would: a target
//! voltage is quantized to a 12-bit ADC code, a few codes of noise are added
//! and the result goes back through [`adc_to_volts`], so the node sees the
//! same staircase values it would on the MCU.

use aquanode_core::{
    constants::sensors::{ADC_MAX_CODE, ADC_REFERENCE_V},
    debug::EntropySource,
    sensors::{adc_to_volts, SensorFrontEnd},
};
use rand::{Rng, RngCore};

/// Reading reported by a DS18B20 with no probe on the bus
pub const DISCONNECTED_PROBE_C: f32 = -127.0;

/// Nearest ADC code for `volts`, clamped to the converter range
pub fn volts_to_code(volts: f32) -> u16 {
    let scaled = volts / ADC_REFERENCE_V * f32::from(ADC_MAX_CODE);
    scaled.round().clamp(0.0, f32::from(ADC_MAX_CODE)) as u16
}

/// Noisy ADC front-end around fixed target voltages
#[derive(Debug, Clone)]
pub struct SimulatedFrontEnd<R: Rng> {
    ph_code: u16,
    ec_code: u16,
    temp_c: f32,
    noise_codes: u16,
    rng: R,
}

impl<R: Rng> SimulatedFrontEnd<R> {
    /// Front-end centred on the given probe voltages and temperature
    pub fn new(ph_volts: f32, ec_volts: f32, temp_c: f32, rng: R) -> Self {
        Self {
            ph_code: volts_to_code(ph_volts),
            ec_code: volts_to_code(ec_volts),
            temp_c,
            noise_codes: 0,
            rng,
        }
    }

    /// Add up to `codes` of uniform noise to each ADC read
    pub fn with_noise(mut self, codes: u16) -> Self {
        self.noise_codes = codes;
        self
    }

    /// Move the pH probe to a new voltage
    pub fn set_ph_volts(&mut self, volts: f32) {
        self.ph_code = volts_to_code(volts);
    }

    /// Move the EC probe to a new voltage
    pub fn set_ec_volts(&mut self, volts: f32) {
        self.ec_code = volts_to_code(volts);
    }

    /// Change the reported temperature; [`DISCONNECTED_PROBE_C`] simulates a bus fault
    pub fn set_temperature(&mut self, temp_c: f32) {
        self.temp_c = temp_c;
    }

    fn sample_code(&mut self, centre: u16) -> u16 {
        if self.noise_codes == 0 {
            return centre;
        }
        let noise = i32::from(self.noise_codes);
        let code = i32::from(centre) + self.rng.gen_range(-noise..=noise);
        code.clamp(0, i32::from(ADC_MAX_CODE)) as u16
    }
}

impl<R: Rng> SensorFrontEnd for SimulatedFrontEnd<R> {
    fn ph_volts(&mut self) -> f32 {
        let code = self.sample_code(self.ph_code);
        adc_to_volts(code)
    }

    fn ec_volts(&mut self) -> f32 {
        let code = self.sample_code(self.ec_code);
        adc_to_volts(code)
    }

    fn temperature_c(&mut self) -> f32 {
        self.temp_c
    }
}

/// Entropy for debug reseeding drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RandEntropy<R: RngCore>(pub R);

impl<R: RngCore> EntropySource for RandEntropy<R> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn code_conversion_round_trips_to_adc_step() {
        assert_eq!(volts_to_code(0.0), 0);
        assert_eq!(volts_to_code(3.3), 4095);
        assert_eq!(volts_to_code(5.0), 4095);
        assert_eq!(volts_to_code(-1.0), 0);
        let v = adc_to_volts(volts_to_code(1.65));
        assert!((v - 1.65).abs() < 3.3 / 4095.0);
    }

    #[test]
    fn noise_stays_within_band() {
        let mut fe = SimulatedFrontEnd::new(1.65, 0.0, 21.0, StdRng::seed_from_u64(9)).with_noise(3);
        let step = 3.3 / 4095.0;
        for _ in 0..200 {
            let v = fe.ph_volts();
            assert!((v - 1.65).abs() <= 4.0 * step, "{v}");
            assert!(fe.ec_volts() >= 0.0);
        }
    }

    #[test]
    fn disconnected_probe_falls_back() {
        let mut fe = SimulatedFrontEnd::new(1.0, 1.0, 21.0, StdRng::seed_from_u64(1));
        fe.set_temperature(DISCONNECTED_PROBE_C);
        assert_eq!(fe.read().temp_c, 22.0);
    }

    #[test]
    fn rand_entropy_feeds_reseed() {
        let mut rng = RandEntropy(StdRng::seed_from_u64(5));
        for _ in 0..100 {
            assert!(rng.below(10) < 10);
        }
    }
}
