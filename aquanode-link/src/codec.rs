//! JSON line codec
//!
//! Inbound lines become [`serde_json::Value`] documents; anything that fails
//! to parse is still passed to the node so it can answer `invalid_json`.
//! Outbound replies are compact JSON terminated by a single `\n`.

use aquanode_core::{
    debug::EntropySource, protocol::Inbound, sensors::SensorFrontEnd, time::Millis, Node, Response,
};
use serde_json::Value;

use crate::LinkResult;

/// Parse a line; `None` when it is not a JSON document
pub fn decode_line(line: &str) -> Option<Value> {
    serde_json::from_str(line).ok()
}

/// Decode `line` and hand it to the node
pub fn dispatch_line<S, E>(node: &mut Node<S, E>, line: &str, now: Millis) -> Option<Response>
where
    S: SensorFrontEnd,
    E: EntropySource,
{
    match decode_line(line) {
        Some(body) => node.handle(Inbound::decoded(line, &body), now),
        None => node.handle(Inbound::undecodable(line), now),
    }
}

/// Serialize a reply as one wire line
pub fn encode(response: &Response) -> LinkResult<Vec<u8>> {
    let mut out = serde_json::to_vec(response)?;
    out.push(b'\n');
    Ok(out)
}
