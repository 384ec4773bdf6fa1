//! Synthetic Readings for Debug Mode
//!
//! In debug mode the node ignores its probes and reports values that sweep
//! slowly through a fixed decade per channel, so a host dashboard can be
//! exercised without wet probes:
//!
//! ```text
//! ph:   6.0 → 6.1 → … → 6.9 → 6.0 → …
//! ec:   1.0 → 1.1 → … → 1.9 → 1.0 → …
//! temp: 20.0 → 20.1 → … → 20.9 → 20.0 → …
//! ```
//!
//! Each channel steps once per [`DEBUG_ADVANCE_INTERVAL_MS`]. Steps work on
//! integer tenths, so repeated advances never accumulate float drift. A value
//! outside its decade (for instance after a `set_sim` override) restarts the
//! sweep at the decade minimum on the next step.
//!
//! Entering debug mode reseeds the three values at random points within
//! their decades using an [`EntropySource`].

use crate::constants::sensors::{DEBUG_EC_RANGE, DEBUG_PH_RANGE, DEBUG_TEMP_RANGE};
use crate::constants::time::DEBUG_ADVANCE_INTERVAL_MS;
use crate::time::{has_elapsed, Millis};

/// Source of pseudo-random numbers for reseeding
///
/// On hardware this is seeded from ADC noise and the microsecond timer.
pub trait EntropySource {
    /// Next 32 random bits
    fn next_u32(&mut self) -> u32;

    /// Value in `0..bound`; `bound` must be non-zero
    fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }
}

/// Marsaglia xorshift32 generator
///
/// Small and good enough for picking demo values; not for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Generator seeded with `seed`; a zero seed is replaced since xorshift
    /// never leaves the all-zero state
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }
}

impl EntropySource for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Step `value` to the next tenth within `[min, max]`, wrapping to `min`
///
/// Values outside the range are treated as `min` before stepping, so the
/// result is always in range.
pub fn advance_tenths(value: f32, min: f32, max: f32) -> f32 {
    let min_tenths = to_tenths(min);
    let max_tenths = to_tenths(max);
    let mut current = to_tenths(value);
    if current < min_tenths || current > max_tenths {
        current = min_tenths;
    }
    let mut next = current + 1;
    if next > max_tenths {
        next = min_tenths;
    }
    next as f32 / 10.0
}

/// Nearest tenth as an integer; NaN maps to 0
fn to_tenths(value: f32) -> i32 {
    (value * 10.0 + 0.5) as i32
}

/// `base` plus a random whole number of tenths in `0..10`
fn seed_in_decade<E: EntropySource>(base: f32, rng: &mut E) -> f32 {
    (to_tenths(base) + rng.below(10) as i32) as f32 / 10.0
}

/// Per-channel overrides from a `set_sim` command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimOverrides {
    /// Replacement pH
    pub ph: Option<f32>,
    /// Replacement conductivity
    pub ec: Option<f32>,
    /// Replacement temperature
    pub temp: Option<f32>,
}

impl SimOverrides {
    /// True when no channel is overridden
    pub fn is_empty(&self) -> bool {
        self.ph.is_none() && self.ec.is_none() && self.temp.is_none()
    }
}

/// Current synthetic values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugState {
    /// Synthetic pH
    pub ph: f32,
    /// Synthetic conductivity
    pub ec: f32,
    /// Synthetic temperature (°C)
    pub temp: f32,
    /// Counter value of the last step or reseed
    pub last_advance_at: Millis,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            ph: DEBUG_PH_RANGE.0,
            ec: DEBUG_EC_RANGE.0,
            temp: DEBUG_TEMP_RANGE.0,
            last_advance_at: 0,
        }
    }
}

/// Steps and reseeds the synthetic values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugGenerator {
    state: DebugState,
    interval_ms: u32,
}

impl DebugGenerator {
    /// Generator stepping every `interval_ms`
    pub fn new(interval_ms: u32) -> Self {
        Self {
            state: DebugState::default(),
            interval_ms,
        }
    }

    /// Generator starting from an explicit state
    pub fn with_state(state: DebugState, interval_ms: u32) -> Self {
        Self { state, interval_ms }
    }

    /// Current values
    pub fn state(&self) -> &DebugState {
        &self.state
    }

    /// Step every channel if a full interval has passed; returns whether it did
    pub fn advance(&mut self, now: Millis) -> bool {
        if !has_elapsed(now, self.state.last_advance_at, self.interval_ms) {
            return false;
        }
        self.state.last_advance_at = now;
        self.state.ph = advance_tenths(self.state.ph, DEBUG_PH_RANGE.0, DEBUG_PH_RANGE.1);
        self.state.ec = advance_tenths(self.state.ec, DEBUG_EC_RANGE.0, DEBUG_EC_RANGE.1);
        self.state.temp = advance_tenths(self.state.temp, DEBUG_TEMP_RANGE.0, DEBUG_TEMP_RANGE.1);
        log_debug!(
            "debug values advanced: ph={} ec={} temp={}",
            self.state.ph, self.state.ec, self.state.temp
        );
        true
    }

    /// Pick fresh starting values and restart the step timer
    pub fn reseed<E: EntropySource>(&mut self, now: Millis, rng: &mut E) {
        self.state.ph = seed_in_decade(DEBUG_PH_RANGE.0, rng);
        self.state.ec = seed_in_decade(DEBUG_EC_RANGE.0, rng);
        self.state.temp = seed_in_decade(DEBUG_TEMP_RANGE.0, rng);
        self.state.last_advance_at = now;
        log_info!(
            "debug values reseeded: ph={} ec={} temp={}",
            self.state.ph, self.state.ec, self.state.temp
        );
    }

    /// Overwrite the channels present in `overrides`, leaving the timer alone
    pub fn apply_overrides(&mut self, overrides: SimOverrides) {
        if let Some(ph) = overrides.ph {
            self.state.ph = ph;
        }
        if let Some(ec) = overrides.ec {
            self.state.ec = ec;
        }
        if let Some(temp) = overrides.temp {
            self.state.temp = temp;
        }
    }
}

impl Default for DebugGenerator {
    fn default() -> Self {
        Self::new(DEBUG_ADVANCE_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Entropy source replaying a fixed sequence
    struct Scripted<'a>(&'a [u32], usize);

    impl EntropySource for Scripted<'_> {
        fn next_u32(&mut self) -> u32 {
            let v = self.0[self.1 % self.0.len()];
            self.1 += 1;
            v
        }
    }

    #[test]
    fn tenths_step_and_wrap() {
        assert_eq!(advance_tenths(6.2, 6.0, 6.9), 6.3);
        assert_eq!(advance_tenths(6.9, 6.0, 6.9), 6.0);
        assert_eq!(advance_tenths(20.9, 20.0, 20.9), 20.0);
        assert_eq!(advance_tenths(1.0, 1.0, 1.9), 1.1);
    }

    #[test]
    fn out_of_range_restarts_at_minimum() {
        // 7.5 is outside 6.0..=6.9: reset to 6.0 then step
        assert_eq!(advance_tenths(7.5, 6.0, 6.9), 6.1);
        assert_eq!(advance_tenths(-3.0, 1.0, 1.9), 1.1);
        assert_eq!(advance_tenths(f32::NAN, 20.0, 20.9), 20.1);
    }

    #[test]
    fn advance_respects_cadence() {
        let mut gen = DebugGenerator::with_state(
            DebugState { ph: 6.2, ec: 1.9, temp: 20.4, last_advance_at: 1000 },
            5000,
        );

        assert!(!gen.advance(5999));
        assert_eq!(gen.state().ph, 6.2);

        assert!(gen.advance(6000));
        assert_eq!(gen.state().ph, 6.3);
        assert_eq!(gen.state().ec, 1.0);
        assert_eq!(gen.state().temp, 20.5);
        assert_eq!(gen.state().last_advance_at, 6000);
    }

    #[test]
    fn reseed_stays_in_decade() {
        let mut gen = DebugGenerator::default();
        let mut rng = Scripted(&[3, 19, 1_000_009], 0);
        gen.reseed(42, &mut rng);

        assert_eq!(gen.state().ph, 6.3);
        assert_eq!(gen.state().ec, 1.9);
        assert_eq!(gen.state().temp, 20.9);
        assert_eq!(gen.state().last_advance_at, 42);
    }

    #[test]
    fn overrides_touch_only_given_channels() {
        let mut gen = DebugGenerator::default();
        gen.apply_overrides(SimOverrides { ph: Some(8.5), ec: None, temp: Some(30.0) });

        assert_eq!(gen.state().ph, 8.5);
        assert_eq!(gen.state().ec, 1.0);
        assert_eq!(gen.state().temp, 30.0);
        assert_eq!(gen.state().last_advance_at, 0);
    }

    #[test]
    fn xorshift_never_sticks_at_zero() {
        let mut rng = XorShift32::new(0);
        let a = rng.next_u32();
        let b = rng.next_u32();
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert!(rng.below(10) < 10);
    }
}
