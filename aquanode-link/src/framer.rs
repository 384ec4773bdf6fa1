//! Byte stream to line framing
//!
//! Mirrors the node's UART handling: `\n` ends a line, `\r` is dropped,
//! lines are trimmed and empty ones skipped. A partial line that grows past
//! [`MAX_LINE_LEN`] bytes is discarded and framing restarts with the next
//! byte.

use aquanode_core::constants::protocol::MAX_LINE_LEN;
use heapless::Vec;

/// Accumulates bytes into complete lines
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8, MAX_LINE_LEN>,
    overflows: u32,
}

impl LineFramer {
    /// Empty framer
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a line when `byte` completes a non-empty one
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\n' => {
                let line = String::from_utf8_lossy(&self.buffer).trim().to_string();
                self.buffer.clear();
                (!line.is_empty()).then_some(line)
            }
            b'\r' => None,
            _ => {
                if self.buffer.push(byte).is_err() {
                    log::warn!("inbound line exceeded {} bytes, discarded", MAX_LINE_LEN);
                    self.buffer.clear();
                    self.overflows = self.overflows.wrapping_add(1);
                }
                None
            }
        }
    }

    /// Feed a slice, calling `on_line` for every completed line in order
    pub fn push_slice(&mut self, bytes: &[u8], mut on_line: impl FnMut(String)) {
        for &byte in bytes {
            if let Some(line) = self.push(byte) {
                on_line(line);
            }
        }
    }

    /// Bytes of the current partial line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Number of partial lines discarded for length
    pub fn overflows(&self) -> u32 {
        self.overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[u8]) -> std::vec::Vec<String> {
        let mut framer = LineFramer::new();
        let mut out = std::vec::Vec::new();
        framer.push_slice(input, |line| out.push(line));
        out
    }

    #[test]
    fn splits_on_newline_and_drops_cr() {
        assert_eq!(lines(b"{\"t\":\"hello\"}\r\n{\"t\":\"get_all\"}\n"), ["{\"t\":\"hello\"}", "{\"t\":\"get_all\"}"]);
    }

    #[test]
    fn trims_and_skips_blank_lines() {
        assert_eq!(lines(b"\n   \n  abc \t\n\r\n"), ["abc"]);
    }

    #[test]
    fn keeps_partial_line_until_terminated() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.push(b'a'), None);
        assert_eq!(framer.push(b'b'), None);
        assert_eq!(framer.pending(), 2);
        assert_eq!(framer.push(b'\n').as_deref(), Some("ab"));
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn overlong_line_is_discarded() {
        let mut framer = LineFramer::new();
        let mut out = std::vec::Vec::new();

        framer.push_slice(&[b'x'; MAX_LINE_LEN], |l| out.push(l));
        assert_eq!(framer.pending(), MAX_LINE_LEN);

        // 513th byte resets the buffer, the tail becomes a new line
        framer.push_slice(b"yz\n", |l| out.push(l));
        assert_eq!(out, ["z"]);
        assert_eq!(framer.overflows(), 1);
    }
}
