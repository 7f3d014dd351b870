//! Reference wiring for the atline engine.
//!
//! Exposes the engine as a serial-like service over TCP: one client at a
//! time connects, sends AT command lines, and receives the responses. This
//! crate owns everything the engine treats as external — the transport
//! implementation, the command table, and the poll loop that drives
//! `service()`.

pub mod commands;
pub mod transport;
