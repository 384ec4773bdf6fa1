//! The Node: State Aggregate and Command Dispatcher
//!
//! [`Node`] owns everything the firmware keeps between loop iterations:
//! calibration, mode, sample history, synthetic values and the host
//! session. It is driven from a single cooperative loop:
//!
//! ```text
//! loop {
//!     if let Some(line) = framer.next_line() {      // at most one per pass
//!         reply = node.handle(inbound(line), now)    // dispatch + liveness
//!     }
//!     announce = node.tick(now)                      // timers, sampling
//! }
//! ```
//!
//! Nothing is shared across threads, so no locking is involved.
//!
//! ## Dispatch
//!
//! - Undecodable line → `error` / `invalid_json`, no state change
//! - No string `t` → `unknown` / `missing_type`, no state change
//! - Any other message marks the host alive first, then:
//!   `hello` → `hello_ack`; `hello_ack` → nothing; `get_all` → `all`;
//!   `set_mode` / `set_sim` → nothing; `set_calib` → `set_calib_ack`;
//!   unknown type → `unknown` / `unsupported_type`
//!
//! `set_mode` and `set_sim` are deliberately left without a reply; hosts in
//! the field poll `get_all` to see their effect.

use serde::{Deserialize, Serialize};

use crate::aggregator::SampleAggregator;
use crate::calibration::CalibrationState;
use crate::constants::protocol::ANNOUNCE_RAW;
use crate::constants::time::{
    ANNOUNCE_INTERVAL_MS, DEBUG_ADVANCE_INTERVAL_MS, LIVENESS_TIMEOUT_MS, SAMPLE_INTERVAL_MS,
    SMOOTHING_WINDOW_MS,
};
use crate::debug::{DebugGenerator, DebugState, EntropySource};
use crate::errors::ProtocolError;
use crate::protocol::{AllReadings, Announcement, Command, Inbound, Response};
use crate::sensors::SensorFrontEnd;
use crate::session::{SessionState, SessionTick};
use crate::time::Millis;

/// Where `get_all` readings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Smoothed, calibrated probe readings
    #[default]
    Real,
    /// Synthetic sweeping values
    Debug,
}

/// Runtime-tunable timings
///
/// Defaults come from [`crate::constants::time`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Minimum spacing between probe samples (ms)
    pub sample_interval_ms: u32,
    /// Smoothing window width (ms)
    pub smoothing_window_ms: u32,
    /// Debug generator step cadence (ms)
    pub debug_interval_ms: u32,
    /// Announcement interval while disconnected (ms)
    pub announce_interval_ms: u32,
    /// Silence before a host is dropped (ms)
    pub liveness_timeout_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            smoothing_window_ms: SMOOTHING_WINDOW_MS,
            debug_interval_ms: DEBUG_ADVANCE_INTERVAL_MS,
            announce_interval_ms: ANNOUNCE_INTERVAL_MS,
            liveness_timeout_ms: LIVENESS_TIMEOUT_MS,
        }
    }
}

impl NodeConfig {
    /// Set the sampling interval
    pub fn with_sample_interval(mut self, ms: u32) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Set the smoothing window
    pub fn with_smoothing_window(mut self, ms: u32) -> Self {
        self.smoothing_window_ms = ms;
        self
    }

    /// Set the debug generator cadence
    pub fn with_debug_interval(mut self, ms: u32) -> Self {
        self.debug_interval_ms = ms;
        self
    }

    /// Set the announcement interval
    pub fn with_announce_interval(mut self, ms: u32) -> Self {
        self.announce_interval_ms = ms;
        self
    }

    /// Set the liveness timeout
    pub fn with_liveness_timeout(mut self, ms: u32) -> Self {
        self.liveness_timeout_ms = ms;
        self
    }
}

/// All node state plus its probe front-end and entropy source
pub struct Node<S: SensorFrontEnd, E: EntropySource> {
    config: NodeConfig,
    mode: Mode,
    calibration: CalibrationState,
    aggregator: SampleAggregator,
    debug: DebugGenerator,
    session: SessionState,
    sensors: S,
    rng: E,
}

impl<S: SensorFrontEnd, E: EntropySource> Node<S, E> {
    /// Node with default timings, booted at counter value 0
    pub fn new(sensors: S, rng: E) -> Self {
        Self::with_config(NodeConfig::default(), sensors, rng)
    }

    /// Node with explicit timings, booted at counter value 0
    ///
    /// Starts in real mode, disconnected, with factory calibration and
    /// freshly seeded debug values.
    pub fn with_config(config: NodeConfig, sensors: S, mut rng: E) -> Self {
        let mut debug = DebugGenerator::new(config.debug_interval_ms);
        debug.reseed(0, &mut rng);

        Self {
            config,
            mode: Mode::Real,
            calibration: CalibrationState::factory(),
            aggregator: SampleAggregator::new(config.smoothing_window_ms, config.sample_interval_ms),
            debug,
            session: SessionState::new(config.announce_interval_ms, config.liveness_timeout_ms),
            sensors,
            rng,
        }
    }

    /// Dispatch one inbound message; returns the reply, if the message has one
    pub fn handle(&mut self, inbound: Inbound<'_>, now: Millis) -> Option<Response> {
        let raw = inbound.raw();
        let Some(body) = inbound.body() else {
            log_debug!("undecodable line: {}", raw);
            return Some(Response::from_error(ProtocolError::InvalidJson, raw));
        };

        let command = match Command::parse(body) {
            Ok(command) => command,
            Err(err) => return Some(Response::from_error(err, raw)),
        };

        self.session.mark_alive(now);
        self.dispatch(command, raw, now)
    }

    fn dispatch(&mut self, command: Command, raw: &str, now: Millis) -> Option<Response> {
        match command {
            Command::Hello => Some(Response::HelloAck(self.announcement(raw))),
            Command::HelloAck => None,
            Command::GetAll => Some(Response::All(self.read_all(raw, now))),
            Command::SetMode(mode) => {
                self.set_mode(mode, now);
                None
            }
            Command::SetSim(overrides) => {
                if overrides.is_empty() {
                    log_debug!("set_sim carried no numeric fields");
                }
                self.debug.apply_overrides(overrides);
                None
            }
            Command::SetCalib(update) => {
                if let Some(update) = update {
                    log_info!("calibration updated, fingerprint {}", update.fingerprint);
                    self.calibration.apply_update(update);
                }
                Some(Response::SetCalibAck { raw: raw.into() })
            }
            Command::Unrecognized(kind) => {
                log_debug!("unsupported message type {}", kind);
                Some(Response::from_error(ProtocolError::UnsupportedType, raw))
            }
        }
    }

    /// Periodic maintenance; returns an announcement when one is due
    ///
    /// Runs the session timers, then either takes a probe sample (real
    /// mode, rate limited) or steps the debug generator (debug mode).
    pub fn tick(&mut self, now: Millis) -> Option<Response> {
        let session = self.session.tick(now);

        match self.mode {
            Mode::Real => {
                self.sample(now);
            }
            Mode::Debug => {
                self.debug.advance(now);
            }
        }

        match session {
            SessionTick::Announce => Some(Response::Hello(self.announcement(ANNOUNCE_RAW))),
            SessionTick::Lost | SessionTick::Idle => None,
        }
    }

    /// Switch mode; entering debug always reseeds the synthetic values
    pub fn set_mode(&mut self, mode: Mode, now: Millis) {
        if mode == Mode::Debug {
            self.debug.reseed(now, &mut self.rng);
        }
        if mode != self.mode {
            log_info!("mode changed to {:?}", mode);
        }
        self.mode = mode;
    }

    fn sample(&mut self, now: Millis) -> bool {
        let sensors = &mut self.sensors;
        let calibration = &self.calibration;
        self.aggregator.sample_if_due(now, || {
            let raw = sensors.read();
            (
                calibration.apply_ph(raw.ph_volts),
                calibration.apply_ec(raw.ec_volts),
                raw.temp_c,
            )
        })
    }

    fn read_all(&mut self, raw: &str, now: Millis) -> AllReadings {
        let (ph, ec, temp) = match self.mode {
            Mode::Debug => {
                self.debug.advance(now);
                let state = self.debug.state();
                (state.ph, state.ec, state.temp)
            }
            Mode::Real => {
                self.sample(now);
                let smoothed = self.aggregator.smoothed(now);
                (smoothed.ph, smoothed.ec, smoothed.temp)
            }
        };

        AllReadings {
            raw: raw.into(),
            ts: now,
            mode: self.mode,
            status: ["ok"],
            ph,
            ec,
            temp,
        }
    }

    fn announcement(&self, raw: &str) -> Announcement {
        Announcement::new(raw, self.calibration.fingerprint())
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Timings in force
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Calibration in force
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    /// Sample history and smoothing
    pub fn aggregator(&self) -> &SampleAggregator {
        &self.aggregator
    }

    /// Current synthetic values
    pub fn debug_state(&self) -> &DebugState {
        self.debug.state()
    }

    /// Host session
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Probe front-end, e.g. to change simulated inputs
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }
}
