//! Time-Windowed Sample Aggregation
//!
//! ## Overview
//!
//! In real mode the node samples its probes at most every
//! [`SAMPLE_INTERVAL_MS`] and keeps the last [`SAMPLE_HISTORY_CAPACITY`]
//! calibrated samples in a [`CircularBuffer`]. A `get_all` request is answered
//! with the mean of every live sample taken within the last
//! [`SMOOTHING_WINDOW_MS`].
//!
//! ## Window Membership
//!
//! A sample counts when `now - sample.timestamp <= window`, computed with
//! wrapping subtraction on the 32-bit counter:
//!
//! ```text
//! window = 10000
//! ts = 0xFFFF_F000, now = 0x0000_1000  → age 8192    (included)
//! ts = 1000,        now = 11000        → age 10000   (included, boundary)
//! ts = 1000,        now = 11001        → age 10001   (excluded)
//! ```
//!
//! A sample stamped "in the future" relative to `now` shows up as a huge age
//! and is excluded.
//!
//! The history may hold samples older than the window; they stay until the
//! ring overwrites them and are simply skipped by [`SampleAggregator::smoothed`].

use serde::Serialize;

use crate::buffer::CircularBuffer;
use crate::constants::sensors::SAMPLE_HISTORY_CAPACITY;
use crate::constants::time::{SAMPLE_INTERVAL_MS, SMOOTHING_WINDOW_MS};
use crate::time::{elapsed_ms, has_elapsed, Millis};

/// One calibrated probe sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    /// Counter value when the probes were read
    pub timestamp: Millis,
    /// Calibrated pH
    pub ph: f32,
    /// Calibrated conductivity
    pub ec: f32,
    /// Water temperature (°C)
    pub temp: f32,
}

/// Mean of the samples inside the smoothing window
///
/// All-zero (apart from `timestamp`) when the window holds no samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SmoothedReading {
    /// The `now` the average was computed for
    pub timestamp: Millis,
    /// Mean pH
    pub ph: f32,
    /// Mean conductivity
    pub ec: f32,
    /// Mean temperature (°C)
    pub temp: f32,
}

/// Sample history plus the sampling gate
#[derive(Debug, Clone)]
pub struct SampleAggregator<const N: usize = SAMPLE_HISTORY_CAPACITY> {
    history: CircularBuffer<Sample, N>,
    window_ms: u32,
    sample_interval_ms: u32,
    last_sample_at: Millis,
}

impl<const N: usize> SampleAggregator<N> {
    /// Aggregator with explicit window and sampling interval
    pub const fn new(window_ms: u32, sample_interval_ms: u32) -> Self {
        Self {
            history: CircularBuffer::new(),
            window_ms,
            sample_interval_ms,
            last_sample_at: 0,
        }
    }

    /// Store a sample, overwriting the oldest one when the history is full
    ///
    /// Does not rate limit; see [`Self::sample_if_due`].
    pub fn record_sample(&mut self, now: Millis, ph: f32, ec: f32, temp: f32) {
        self.history.push(Sample {
            timestamp: now,
            ph,
            ec,
            temp,
        });
    }

    /// True when a full sampling interval has passed since the last sample
    pub fn sample_due(&self, now: Millis) -> bool {
        has_elapsed(now, self.last_sample_at, self.sample_interval_ms)
    }

    /// Read and record a sample if one is due
    ///
    /// `read` is only called when the gate is open, so a slow sensor bus is
    /// not touched more often than the sampling interval allows. Returns
    /// whether a sample was taken.
    pub fn sample_if_due<F>(&mut self, now: Millis, read: F) -> bool
    where
        F: FnOnce() -> (f32, f32, f32),
    {
        if !self.sample_due(now) {
            return false;
        }
        self.last_sample_at = now;
        let (ph, ec, temp) = read();
        self.record_sample(now, ph, ec, temp);
        true
    }

    /// Mean of the samples no older than the window at `now`
    pub fn smoothed(&self, now: Millis) -> SmoothedReading {
        let mut sum_ph = 0.0f32;
        let mut sum_ec = 0.0f32;
        let mut sum_temp = 0.0f32;
        let mut count = 0usize;

        for sample in self.history.iter() {
            if elapsed_ms(now, sample.timestamp) <= self.window_ms {
                sum_ph += sample.ph;
                sum_ec += sample.ec;
                sum_temp += sample.temp;
                count += 1;
            }
        }

        if count == 0 {
            return SmoothedReading {
                timestamp: now,
                ..SmoothedReading::default()
            };
        }

        let n = count as f32;
        SmoothedReading {
            timestamp: now,
            ph: sum_ph / n,
            ec: sum_ec / n,
            temp: sum_temp / n,
        }
    }

    /// Raw sample history
    pub fn history(&self) -> &CircularBuffer<Sample, N> {
        &self.history
    }

    /// Number of live samples
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True before the first sample
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Counter value of the last sample taken through the gate
    pub fn last_sample_at(&self) -> Millis {
        self.last_sample_at
    }

    /// Smoothing window in milliseconds
    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }
}

impl<const N: usize> Default for SampleAggregator<N> {
    fn default() -> Self {
        Self::new(SMOOTHING_WINDOW_MS, SAMPLE_INTERVAL_MS)
    }
}
