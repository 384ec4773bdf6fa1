//! Time handling for the node
//!
//! The node only ever sees a 32-bit millisecond counter that starts at boot
//! and wraps. Nothing here compares two timestamps with `<`; every interval
//! check goes through [`elapsed_ms`], which subtracts modulo 2^32 so a timer
//! armed just before the rollover still fires on time just after it.
//!
//! ```text
//! since = 0xFFFF_FF00, now = 0x0000_0064
//! now.wrapping_sub(since) = 0x164 = 356 ms   (correct)
//! now < since                                 (a naive check would say "in the future")
//! ```

/// Milliseconds since boot, wrapping at 2^32
pub type Millis = u32;

/// Milliseconds from `since` to `now`, correct across one counter wrap
#[inline]
pub const fn elapsed_ms(now: Millis, since: Millis) -> u32 {
    now.wrapping_sub(since)
}

/// True once at least `interval` ms have passed since `since`
#[inline]
pub const fn has_elapsed(now: Millis, since: Millis, interval: u32) -> bool {
    elapsed_ms(now, since) >= interval
}

/// Source of the node's monotonic millisecond counter
///
/// On hardware this reads the timer peripheral; in tests it is a
/// [`MockTimeSource`]. Implementations must wrap rather than saturate.
pub trait TimeSource {
    /// Current counter value
    fn now(&self) -> Millis;
}

/// Manually driven clock for tests and replays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockTimeSource {
    now: Millis,
}

impl MockTimeSource {
    /// Clock stopped at `start`
    pub const fn new(start: Millis) -> Self {
        Self { now: start }
    }

    /// Jump to an absolute counter value
    pub fn set(&mut self, now: Millis) {
        self.now = now;
    }

    /// Move forward, wrapping like the hardware counter
    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Millis {
        self.now
    }
}

/// Host clock (requires std)
///
/// Milliseconds since construction, truncated to 32 bits so it wraps the
/// same way the MCU counter does.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
    offset: Millis,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Clock reading 0 now
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Clock reading `offset` now; handy for exercising the rollover
    pub fn starting_at(offset: Millis) -> Self {
        Self {
            origin: std::time::Instant::now(),
            offset,
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Millis {
        // Wraps like the 32-bit MCU counter
        let ms = self.origin.elapsed().as_millis() as u32;
        self.offset.wrapping_add(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_advances() {
        let mut time = MockTimeSource::new(1000);
        assert_eq!(time.now(), 1000);

        time.advance(500);
        assert_eq!(time.now(), 1500);
    }

    #[test]
    fn mock_time_wraps() {
        let mut time = MockTimeSource::new(u32::MAX - 9);
        time.advance(20);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn elapsed_across_rollover() {
        assert_eq!(elapsed_ms(0x0000_0064, 0xFFFF_FF00), 356);
        assert_eq!(elapsed_ms(5000, 1000), 4000);
        assert_eq!(elapsed_ms(1000, 1000), 0);
    }

    #[test]
    fn interval_check_is_inclusive() {
        assert!(!has_elapsed(1199, 0, 1200));
        assert!(has_elapsed(1200, 0, 1200));
        assert!(has_elapsed(100, u32::MAX - 1099, 1200));
        assert!(!has_elapsed(99, u32::MAX - 1099, 1200));
    }
}
