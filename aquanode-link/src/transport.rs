//! Byte transports for the serial link
//!
//! The link only needs non-blocking reads and whole writes, so platform
//! specifics stay behind [`SerialTransport`]. [`ChannelTransport`] covers
//! the host side: a reader thread pushes chunks into a channel and the poll
//! loop drains it without blocking.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Platform byte stream
pub trait SerialTransport {
    /// Transport-specific error type
    type Error;

    /// Copy available bytes into `buffer` without blocking; `Ok(0)` when idle
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` in full
    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}

/// Transport fed by an mpsc channel of byte chunks
pub struct ChannelTransport<W: Write> {
    rx: Receiver<Vec<u8>>,
    inbox: VecDeque<u8>,
    writer: W,
    closed: bool,
}

impl<W: Write> ChannelTransport<W> {
    /// Transport reading chunks from `rx` and writing to `writer`
    pub fn new(rx: Receiver<Vec<u8>>, writer: W) -> Self {
        Self {
            rx,
            inbox: VecDeque::new(),
            writer,
            closed: false,
        }
    }

    /// True once the sender hung up and every buffered byte was consumed
    pub fn is_closed(&self) -> bool {
        self.closed && self.inbox.is_empty()
    }

    /// Writer half, e.g. to inspect captured output
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn fill(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => self.inbox.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        log::info!("input stream closed");
                    }
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl ChannelTransport<io::Stdout> {
    /// Transport over the process's stdin and stdout
    pub fn stdio() -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            let mut chunk = [0u8; 256];
            loop {
                match stdin.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(chunk[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        log::error!("stdin read failed: {}", err);
                        break;
                    }
                }
            }
        });
        Self::new(rx, io::stdout())
    }
}

impl<W: Write> SerialTransport for ChannelTransport<W> {
    type Error = io::Error;

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        if self.inbox.len() < buffer.len() {
            self.fill();
        }
        let n = buffer.len().min(self.inbox.len());
        for (slot, byte) in buffer.iter_mut().zip(self.inbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn send(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }
}
