//! Line-oriented AT command protocol engine.
//!
//! This crate interprets a byte stream from a serial-like transport as a
//! sequence of AT-style command lines, resolves each against a caller-supplied
//! command table, invokes the matching handler, and answers with a one-line
//! status response.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → device): `AT`-prefixed text lines ended by a
//!   configurable terminator (default `\r\n`)
//! - **Responses** (device → host): a handler may write payload lines, then
//!   the engine emits exactly one `OK` or `ERROR` line per cycle
//! - **No echo**: received bytes are not mirrored back
//!
//! # Command Forms
//!
//! Each registered name supports up to four forms, each with its own
//! optional handler:
//!
//! - **RUN**: `AT+FOO` - bare invocation
//! - **READ**: `AT+FOO?` - query current state
//! - **TEST**: `AT+FOO=?` - query accepted parameters
//! - **WRITE**: `AT+FOO=1,2` - supply comma-separated parameters
//!
//! An empty line (bare terminator) is acknowledged with `OK` without
//! dispatching anything.
//!
//! # Example
//!
//! ```rust,ignore
//! use atline_engine::{AtEngine, CommandSpec, Context, EngineConfig, MemoryTransport};
//!
//! let commands = vec![
//!     CommandSpec::new("+PING").on_run(|_| true),
//!     CommandSpec::new("+ECHO").on_write(|ctx: &mut Context| {
//!         while let Some(token) = ctx.next() {
//!             ctx.write_line(token);
//!         }
//!         true
//!     }),
//! ];
//!
//! let mut engine = AtEngine::with_transport(
//!     &commands,
//!     EngineConfig::default(),
//!     MemoryTransport::new(),
//! );
//!
//! // Drive the engine from a poll loop; partial lines carry across calls.
//! engine.transport_mut().unwrap().feed(b"AT+PING\r\n");
//! engine.service()?;
//! assert_eq!(engine.transport_mut().unwrap().take_output(), b"OK\r\n");
//! ```

mod buffer;
mod classify;
mod engine;
mod error;
mod table;
mod tokens;
mod transport;

pub use buffer::{DEFAULT_LINE_CAPACITY, DEFAULT_TERMINATOR};
pub use classify::CommandKind;
pub use engine::{AtEngine, Context, EngineConfig, RESPONSE_ERROR, RESPONSE_OK};
pub use error::{EngineError, EngineResult};
pub use table::{CommandSpec, Handler};
pub use tokens::Tokens;
pub use transport::{MemoryTransport, Transport};
