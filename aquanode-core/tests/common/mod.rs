//! Shared fixtures for node integration tests
//!
//! - [`HostScript`]: drives a node the way a host would, line by line
//! - [`RampFrontEnd`]: probe front-end whose readings change per sample

#![allow(dead_code)]

use aquanode_core::{
    debug::XorShift32,
    protocol::Inbound,
    sensors::SensorFrontEnd,
    time::{Millis, MockTimeSource, TimeSource},
    Node, Response,
};
use serde_json::Value;

/// Front-end stepping each channel by a fixed amount on every read
pub struct RampFrontEnd {
    pub ph_volts: f32,
    pub ec_volts: f32,
    pub temp_c: f32,
    pub step: f32,
}

impl RampFrontEnd {
    pub fn new(ph_volts: f32, ec_volts: f32, temp_c: f32, step: f32) -> Self {
        Self { ph_volts, ec_volts, temp_c, step }
    }
}

impl SensorFrontEnd for RampFrontEnd {
    fn ph_volts(&mut self) -> f32 {
        let v = self.ph_volts;
        self.ph_volts += self.step;
        v
    }

    fn ec_volts(&mut self) -> f32 {
        let v = self.ec_volts;
        self.ec_volts += self.step;
        v
    }

    fn temperature_c(&mut self) -> f32 {
        self.temp_c
    }
}

/// A node plus a mock clock, with every outbound message recorded
pub struct HostScript<S: SensorFrontEnd> {
    pub node: Node<S, XorShift32>,
    pub clock: MockTimeSource,
    pub outbox: Vec<Value>,
}

impl<S: SensorFrontEnd> HostScript<S> {
    pub fn new(sensors: S) -> Self {
        Self {
            node: Node::new(sensors, XorShift32::new(0xC0FFEE)),
            clock: MockTimeSource::new(0),
            outbox: Vec::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    /// Send one line at the current time and return the reply as JSON
    pub fn send(&mut self, line: &str) -> Option<Value> {
        let now = self.now();
        let reply = match serde_json::from_str::<Value>(line) {
            Ok(value) => self.node.handle(Inbound::decoded(line, &value), now),
            Err(_) => self.node.handle(Inbound::undecodable(line), now),
        };
        reply.map(|r| self.record(&r))
    }

    /// Advance the clock in `step` increments, ticking the node each time
    pub fn run_for(&mut self, duration: u32, step: u32) {
        let mut remaining = duration;
        while remaining > 0 {
            let delta = step.min(remaining);
            self.clock.advance(delta);
            remaining -= delta;
            let now = self.now();
            if let Some(announce) = self.node.tick(now) {
                self.record(&announce);
            }
        }
    }

    /// Outbound messages of type `t`
    pub fn sent(&self, t: &str) -> Vec<&Value> {
        self.outbox.iter().filter(|v| v["t"] == t).collect()
    }

    fn record(&mut self, reply: &Response) -> Value {
        let value = serde_json::to_value(reply).expect("replies always serialize");
        self.outbox.push(value.clone());
        value
    }
}
