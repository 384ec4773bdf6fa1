//! Integration tests for the serial link
//!
//! Feeds raw bytes through a channel transport and checks the lines the
//! node writes back.

use std::sync::mpsc::{self, Sender};

use aquanode_core::{debug::XorShift32, sensors::FixedFrontEnd, Mode, Node};
use aquanode_link::{link::MAX_QUEUED_LINES, ChannelTransport, SerialLink};
use serde_json::Value;

type TestLink = SerialLink<ChannelTransport<Vec<u8>>, FixedFrontEnd, XorShift32>;

fn link() -> (Sender<Vec<u8>>, TestLink) {
    let (tx, rx) = mpsc::channel();
    let node = Node::new(FixedFrontEnd::new(1.65, 1.65, 21.0), XorShift32::new(11));
    (tx, SerialLink::new(ChannelTransport::new(rx, Vec::new()), node))
}

fn output(link: &TestLink) -> Vec<Value> {
    let text = std::str::from_utf8(link.transport().writer()).unwrap();
    assert!(text.is_empty() || text.ends_with('\n'));
    text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

#[test]
fn test_hello_round_trip() {
    let (tx, mut link) = link();
    tx.send(b"{\"t\":\"hello\"}\r\n".to_vec()).unwrap();
    link.poll(50).unwrap();

    let out = output(&link);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["t"], "hello_ack");
    assert_eq!(out[0]["raw"], "{\"t\":\"hello\"}");
    assert_eq!(out[0]["fw"], "pico-0.1.0");
    assert!(link.node().session().is_connected());
}

#[test]
fn test_one_line_per_poll() {
    let (tx, mut link) = link();
    tx.send(b"{\"t\":\"get_all\"}\n{\"t\":\"bogus\"}\nnot json\n".to_vec()).unwrap();

    link.poll(10).unwrap();
    assert_eq!(link.stats().lines_received, 3);
    assert_eq!(link.queued_lines(), 2);
    assert_eq!(output(&link).len(), 1);

    link.poll(20).unwrap();
    link.poll(30).unwrap();
    assert_eq!(link.queued_lines(), 0);

    let kinds: Vec<_> = output(&link).iter().map(|v| v["t"].as_str().unwrap().to_string()).collect();
    assert_eq!(kinds, ["all", "unknown", "error"]);
    assert_eq!(link.stats().lines_handled, 3);
}

#[test]
fn test_backlog_is_bounded_under_flood() {
    let (tx, mut link) = link();
    let burst = b"{\"t\":\"get_all\"}\n".repeat(200);

    for round in 0..100u32 {
        tx.send(burst.clone()).unwrap();
        link.poll(round * 10).unwrap();
        assert!(link.queued_lines() <= MAX_QUEUED_LINES);
    }

    let stats = link.stats().clone();
    assert_eq!(stats.lines_received, 20_000);
    assert_eq!(stats.lines_handled, 100);
    assert_eq!(link.queued_lines(), MAX_QUEUED_LINES - 1);
    assert_eq!(
        stats.lines_dropped,
        stats.lines_received - stats.lines_handled - link.queued_lines() as u64
    );

    let replies = output(&link).iter().filter(|v| v["t"] == "all").count();
    assert_eq!(replies, 100);
}

#[test]
fn test_split_chunks_reassemble() {
    let (tx, mut link) = link();
    tx.send(b"{\"t\":\"set_mode\",".to_vec()).unwrap();
    link.poll(0).unwrap();
    assert_eq!(link.framer().pending(), 16);

    tx.send(b"\"mode\":\"debug\"}\n".to_vec()).unwrap();
    link.poll(10).unwrap();
    assert_eq!(link.node().mode(), Mode::Debug);
    // set_mode has no reply
    assert!(output(&link).is_empty());
}

#[test]
fn test_announces_on_tick_when_idle() {
    let (_tx, mut link) = link();
    for now in (0..=2400).step_by(100) {
        link.poll(now).unwrap();
    }

    let out = output(&link);
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|v| v["t"] == "hello" && v["raw"] == "probe"));
    assert_eq!(link.stats().announcements, 2);
    assert_eq!(link.stats().messages_sent, 2);
}

#[test]
fn test_long_input_is_dropped() {
    let (tx, mut link) = link();
    let mut junk = vec![b'x'; 600];
    junk.extend_from_slice(b"\n{\"t\":\"hello\"}\n");
    tx.send(junk).unwrap();

    link.poll(10).unwrap();
    link.poll(20).unwrap();

    // The 87 bytes after the reset still form a (garbage) line
    let out = output(&link);
    assert_eq!(out[0]["t"], "error");
    assert_eq!(out[0]["raw"].as_str().unwrap().len(), 87);
    assert_eq!(out[1]["t"], "hello_ack");
    assert_eq!(link.framer().overflows(), 1);
}

#[test]
fn test_closed_input_is_reported() {
    let (tx, mut link) = link();
    tx.send(b"{\"t\":\"hello_ack\"}\n".to_vec()).unwrap();
    drop(tx);

    link.poll(5).unwrap();
    assert!(link.transport().is_closed());
    assert!(link.node().session().is_connected());
}
