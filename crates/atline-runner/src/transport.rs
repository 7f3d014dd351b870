//! TCP-backed transport.
//!
//! Wraps a nonblocking `TcpStream` behind the engine's [`Transport`] trait.
//! Reads are pumped into a local queue so `available`/`read_byte` stay
//! synchronous and never touch the socket; writes go straight out.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use atline_engine::Transport;

/// A serial-like transport over one TCP connection.
pub struct TcpTransport {
    stream: TcpStream,
    rx: VecDeque<u8>,
    closed: bool,
}

impl TcpTransport {
    /// Wrap a connected stream, switching it to nonblocking mode.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(TcpTransport {
            stream,
            rx: VecDeque::new(),
            closed: false,
        })
    }

    /// Pull whatever the socket currently has into the local read queue.
    ///
    /// Call once per poll tick, before `service()`.
    pub fn pump(&mut self) {
        let mut chunk = [0u8; 256];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => self.rx.extend(chunk[..n].iter().copied()),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!("socket read failed: {err}");
                    self.closed = true;
                    break;
                }
            }
        }
    }

    /// True once the peer has hung up or the socket failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for TcpTransport {
    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.closed {
            return;
        }
        let mut rest = bytes;
        while !rest.is_empty() {
            match self.stream.write(rest) {
                Ok(0) => {
                    self.closed = true;
                    return;
                }
                Ok(n) => rest = &rest[n..],
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    tracing::warn!("socket write failed: {err}");
                    self.closed = true;
                    return;
                }
            }
        }
    }
}
