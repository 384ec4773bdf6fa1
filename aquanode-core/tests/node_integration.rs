//! Integration tests for the node as a host sees it
//!
//! Drives a [`Node`] through a mock clock and JSON lines, checking the
//! outbound traffic end to end: announcements, liveness, sampling,
//! calibration and debug mode.

mod common;

use aquanode_core::{sensors::FixedFrontEnd, Mode};
use common::{HostScript, RampFrontEnd};
use serde_json::json;

fn bench() -> HostScript<FixedFrontEnd> {
    HostScript::new(FixedFrontEnd::new(1.65, 1.65, 21.0))
}

#[test]
fn test_announces_until_host_greets() {
    let mut host = bench();
    host.run_for(2500, 100);

    let hellos = host.sent("hello");
    assert_eq!(hellos.len(), 2);
    assert_eq!(hellos[0]["raw"], "probe");
    assert_eq!(hellos[0]["fw"], "pico-0.1.0");
    assert_eq!(hellos[0]["calibHash"], "default");
    assert_eq!(hellos[0]["cap"]["pins"]["ph"], "adc2");

    let ack = host.send(r#"{"t":"hello"}"#).unwrap();
    assert_eq!(ack["t"], "hello_ack");
    assert_eq!(ack["raw"], r#"{"t":"hello"}"#);

    host.run_for(3000, 100);
    assert_eq!(host.sent("hello").len(), 2);
}

#[test]
fn test_silent_host_is_dropped_and_announcements_resume() {
    let mut host = bench();
    host.send(r#"{"t":"hello_ack"}"#);
    assert!(host.node.session().is_connected());

    host.run_for(4000, 100);
    assert!(host.node.session().is_connected());

    host.run_for(100, 100);
    assert!(!host.node.session().is_connected());
    assert!(host.sent("hello").is_empty());

    // Demotion at 4100; next announcement one interval later
    host.run_for(1100, 100);
    assert!(host.sent("hello").is_empty());
    host.run_for(100, 100);
    assert_eq!(host.sent("hello").len(), 1);
}

#[test]
fn test_any_typed_message_counts_as_traffic() {
    let mut host = bench();
    host.send(r#"{"t":"hello_ack"}"#);
    host.run_for(3000, 500);

    let reply = host.send(r#"{"t":"reboot"}"#).unwrap();
    assert_eq!(reply, json!({"t": "unknown", "msg": "unsupported_type", "raw": "{\"t\":\"reboot\"}"}));

    host.run_for(3000, 500);
    assert!(host.node.session().is_connected());
}

#[test]
fn test_garbage_does_not_connect() {
    let mut host = bench();

    let reply = host.send("hello?").unwrap();
    assert_eq!(reply, json!({"t": "error", "msg": "invalid_json", "raw": "hello?"}));

    let reply = host.send("[1,2,3]").unwrap();
    assert_eq!(reply["msg"], "missing_type");
    let reply = host.send(r#"{"type":"hello"}"#).unwrap();
    assert_eq!(reply["msg"], "missing_type");

    assert!(!host.node.session().is_connected());
    host.run_for(1200, 100);
    assert_eq!(host.sent("hello").len(), 1);
}

#[test]
fn test_smoothing_window_forgets_old_samples() {
    let mut host = bench();
    host.run_for(5000, 250);

    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(all["t"], "all");
    assert_eq!(all["mode"], "real");
    assert_eq!(all["status"], json!(["ok"]));
    assert!((all["ph"].as_f64().unwrap() - 7.0).abs() < 1e-3);
    assert!((all["ec"].as_f64().unwrap() - 2.5).abs() < 1e-3);

    *host.node.sensors_mut() = FixedFrontEnd::new(3.3, 3.3, 25.0);
    host.run_for(10_250, 250);

    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(all["ts"], 15_250);
    assert!((all["ph"].as_f64().unwrap() - 14.0).abs() < 1e-3);
    assert!((all["ec"].as_f64().unwrap() - 5.0).abs() < 1e-3);
    assert_eq!(all["temp"], 25.0);
}

#[test]
fn test_window_average_of_ramp() {
    // pH voltage climbs 0.01 V per sample inside the lower pH segment
    let mut host = HostScript::new(RampFrontEnd::new(0.0, 0.0, 20.0, 0.01));
    host.run_for(2500, 250);

    // Ten samples at 0.00..=0.09 V; mean 0.045 V maps to 0.045 * 7 / 1.65
    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(host.node.aggregator().len(), 10);
    let expected = 0.045 * 7.0 / 1.65;
    assert!((all["ph"].as_f64().unwrap() - expected).abs() < 1e-3);
}

#[test]
fn test_history_is_bounded() {
    let mut host = bench();
    host.run_for(30_000, 250);
    assert_eq!(host.node.aggregator().len(), 64);
}

#[test]
fn test_calibration_round_trip() {
    let mut host = bench();
    let line = json!({
        "t": "set_calib",
        "payload": {
            "ph": {"points": [{"raw": 0.0, "val": 2}, {"raw": 1.65, "val": 4}, {"raw": 3.3, "val": 12}]},
            "ec": {"points": [{"raw": 0.0, "val": 0}, {"raw": 1.65, "val": 10}]},
            "calibHash": "lab-2024-05"
        }
    })
    .to_string();

    let ack = host.send(&line).unwrap();
    assert_eq!(ack, json!({"t": "set_calib_ack", "raw": line}));

    let hello = host.send(r#"{"t":"hello"}"#).unwrap();
    assert_eq!(hello["calibHash"], "lab-2024-05");

    host.run_for(1000, 250);
    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert!((all["ph"].as_f64().unwrap() - 4.0).abs() < 1e-3);
    assert!((all["ec"].as_f64().unwrap() - 10.0).abs() < 1e-3);
}

#[test]
fn test_calibration_without_hash_gets_fingerprint() {
    let mut host = bench();
    host.send(r#"{"t":"set_calib","payload":{"ec":{"points":[{"raw":0,"val":0},{"raw":2,"val":4}]}}}"#);

    let hash = host.node.calibration().fingerprint().to_string();
    assert_ne!(hash, "default");
    assert!(hash.len() <= 8);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    // pH curve untouched
    assert!((host.node.calibration().apply_ph(1.65) - 7.0).abs() < 1e-4);
}

#[test]
fn test_debug_mode_sweeps_within_decades() {
    let mut host = bench();
    assert!(host.send(r#"{"t":"set_mode","mode":"debug"}"#).is_none());
    assert_eq!(host.node.mode(), Mode::Debug);

    for _ in 0..30 {
        host.run_for(2500, 500);
        let all = host.send(r#"{"t":"get_all"}"#).unwrap();
        assert_eq!(all["mode"], "debug");
        let ph = all["ph"].as_f64().unwrap();
        let ec = all["ec"].as_f64().unwrap();
        let temp = all["temp"].as_f64().unwrap();
        assert!((5.95..=6.95).contains(&ph), "ph {ph}");
        assert!((0.95..=1.95).contains(&ec), "ec {ec}");
        assert!((19.95..=20.95).contains(&temp), "temp {temp}");
    }

    // No probe samples taken while in debug mode
    assert!(host.node.aggregator().is_empty());
}

#[test]
fn test_sim_override_then_back_to_real() {
    let mut host = bench();
    host.send(r#"{"t":"set_mode","mode":"debug"}"#);
    host.send(r#"{"t":"set_sim","ph":9.5,"temp":"warm"}"#);

    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(all["ph"], 9.5);

    host.send(r#"{"t":"set_mode","mode":"real"}"#);
    host.run_for(500, 250);
    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(all["mode"], "real");
    assert!((all["ph"].as_f64().unwrap() - 7.0).abs() < 1e-3);
}

#[test]
fn test_counter_rollover_keeps_sampling() {
    let mut host = bench();
    host.clock.set(u32::MAX - 1999);
    host.send(r#"{"t":"hello_ack"}"#);

    host.run_for(4000, 250);
    assert!(host.node.session().is_connected());
    assert_eq!(host.node.aggregator().len(), 16);

    let all = host.send(r#"{"t":"get_all"}"#).unwrap();
    assert_eq!(all["ts"], 2000);
    assert!((all["ph"].as_f64().unwrap() - 7.0).abs() < 1e-3);
}
