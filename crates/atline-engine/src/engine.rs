//! The command engine: poll-driven byte intake, dispatch, and response.
//!
//! One call to [`AtEngine::service`] drains whatever the transport has
//! buffered, one byte at a time, through the cycle below:
//!
//! ```text
//! transport bytes
//!   -> line buffer (+ terminator match)
//!   -> on terminator: classify -> resolve -> [tokenize params] -> handler
//!   -> "OK" / "ERROR"
//!   -> buffer reset
//! ```
//!
//! The cycle completes synchronously inside `service`; between calls the only
//! persistent state is the partially accumulated line, which makes commands
//! resilient to arriving fragmented across any number of invocations.

use crate::buffer::{LineBuffer, Push};
use crate::classify::{classify, Classified, CommandKind};
use crate::error::{EngineError, EngineResult};
use crate::table::{resolve, CommandSpec};
use crate::tokens::Tokens;
use crate::transport::Transport;
use crate::{DEFAULT_LINE_CAPACITY, DEFAULT_TERMINATOR};

/// Success token emitted after a completed cycle.
pub const RESPONSE_OK: &str = "OK";

/// Failure token emitted after a rejected or failed cycle.
pub const RESPONSE_ERROR: &str = "ERROR";

/// Engine construction parameters.
///
/// All values are fixed for the lifetime of the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum bytes buffered for one command line.
    pub capacity: usize,
    /// Byte sequence marking the end of one command. Must not be empty.
    pub terminator: Vec<u8>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            capacity: DEFAULT_LINE_CAPACITY,
            terminator: DEFAULT_TERMINATOR.to_vec(),
        }
    }
}

/// Per-cycle context handed to command handlers.
///
/// Exposes the classified command name and form, the parameter tokenizer for
/// WRITE commands, and the response sink so a handler can emit payload lines
/// before the engine writes the final status token.
pub struct Context<'c> {
    name: &'c str,
    kind: CommandKind,
    tokens: Tokens<'c>,
    transport: &'c mut dyn Transport,
}

impl<'c> Context<'c> {
    /// The resolved command name (without the `AT` prefix).
    pub fn name(&self) -> &'c str {
        self.name
    }

    /// The classified command form.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// True while parameter tokens remain.
    pub fn has_next(&self) -> bool {
        self.tokens.has_next()
    }

    /// The next comma-delimited parameter token, or `None` once exhausted.
    pub fn next(&mut self) -> Option<&'c str> {
        self.tokens.next()
    }

    /// The remaining parameter tokenizer.
    pub fn tokens(&mut self) -> &mut Tokens<'c> {
        &mut self.tokens
    }

    /// Write raw bytes to the transport sink.
    pub fn write(&mut self, bytes: &[u8]) {
        self.transport.write(bytes);
    }

    /// Write a line (CRLF-terminated) to the transport sink.
    pub fn write_line(&mut self, line: &str) {
        self.transport.write_line(line);
    }
}

/// Line-oriented command protocol engine.
///
/// The engine owns the working line buffer and an optional transport handle;
/// the command table is borrowed from the caller and never mutated. At most
/// one command is in flight: a cycle is assembled, dispatched, and answered
/// before the next byte of the following command is considered.
///
/// There is no timeout on terminator arrival: a command that never completes
/// holds the buffer (bounded by its capacity) until the terminator shows up
/// or overflow forces a reset.
pub struct AtEngine<'a, T: Transport> {
    commands: &'a [CommandSpec],
    line: LineBuffer,
    transport: Option<T>,
}

impl<'a, T: Transport> AtEngine<'a, T> {
    /// Create an engine over a command table with no transport attached.
    ///
    /// [`service`](AtEngine::service) fails with
    /// [`EngineError::TransportUnavailable`] until one is attached.
    pub fn new(commands: &'a [CommandSpec], config: EngineConfig) -> Self {
        AtEngine {
            commands,
            line: LineBuffer::new(config.capacity, config.terminator),
            transport: None,
        }
    }

    /// Create an engine with a transport already attached.
    pub fn with_transport(commands: &'a [CommandSpec], config: EngineConfig, transport: T) -> Self {
        let mut engine = Self::new(commands, config);
        engine.attach(transport);
        engine
    }

    /// Attach a transport, replacing any previous one.
    pub fn attach(&mut self, transport: T) {
        self.transport = Some(transport);
    }

    /// Detach and return the current transport, if any.
    pub fn detach(&mut self) -> Option<T> {
        self.transport.take()
    }

    /// The attached transport.
    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Mutable access to the attached transport.
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// Number of bytes buffered for the in-progress command.
    pub fn buffered_len(&self) -> usize {
        self.line.len()
    }

    /// Discard any partially accumulated command line. Idempotent.
    ///
    /// The engine resets itself after every completed or rejected cycle;
    /// call this only to abandon a partial line, e.g. when the byte stream
    /// is replaced mid-command.
    pub fn reset(&mut self) {
        self.line.reset();
    }

    /// Service the transport: drain available bytes and run command cycles.
    ///
    /// Successful cycles keep draining within the same call. The first failed
    /// cycle (overflow, syntax, unknown command, or handler failure) emits its
    /// `ERROR` response, resets the buffer, and returns immediately; bytes
    /// still available stay queued for the next invocation. Returns `Ok(())`
    /// once the source reports nothing more to read.
    pub fn service(&mut self) -> EngineResult<()> {
        let Some(transport) = self.transport.as_mut() else {
            return Err(EngineError::TransportUnavailable);
        };

        while transport.available() > 0 {
            let Some(byte) = transport.read_byte() else {
                break;
            };

            // Serial glitches show up as NULs; they are never command data.
            if byte == 0 {
                continue;
            }

            match self.line.push(byte) {
                Push::Pending => {}
                Push::Overflow => {
                    let capacity = self.line.capacity();
                    log::warn!("line buffer overflow (capacity {capacity})");
                    transport.write_line(RESPONSE_ERROR);
                    self.line.reset();
                    return Err(EngineError::BufferOverflow { capacity });
                }
                Push::Complete => {
                    let outcome =
                        dispatch_line(self.commands, self.line.as_bytes(), &mut *transport);
                    self.line.reset();
                    outcome?;
                }
            }
        }

        Ok(())
    }
}

/// Run one full command cycle over a terminated line.
///
/// Emits the status response for every path, including the empty-line ping
/// acknowledgment, before reporting the outcome to `service`.
fn dispatch_line(
    commands: &[CommandSpec],
    line: &[u8],
    transport: &mut dyn Transport,
) -> EngineResult<()> {
    let classified = match classify(line) {
        Ok(classified) => classified,
        Err(err) => {
            log::warn!("rejected command line: {err}");
            transport.write_line(RESPONSE_ERROR);
            return Err(EngineError::Syntax {
                line: String::from_utf8_lossy(line).into_owned(),
            });
        }
    };

    let (kind, name_range, params_range) = match classified {
        Classified::Ping => {
            // Empty line: acknowledged without dispatching anything.
            transport.write_line(RESPONSE_OK);
            return Ok(());
        }
        Classified::Command { kind, name, params } => (kind, name, params),
    };

    let Ok(name) = std::str::from_utf8(&line[name_range]) else {
        transport.write_line(RESPONSE_ERROR);
        return Err(EngineError::Syntax {
            line: String::from_utf8_lossy(line).into_owned(),
        });
    };

    let params = match params_range {
        Some(range) => match std::str::from_utf8(&line[range]) {
            Ok(params) => Some(params),
            Err(_) => {
                log::warn!("non-UTF-8 parameter region for {name:?}");
                transport.write_line(RESPONSE_ERROR);
                return Err(EngineError::Syntax {
                    line: String::from_utf8_lossy(line).into_owned(),
                });
            }
        },
        None => None,
    };

    // A name with no table entry and an entry without a handler for this
    // form fail the same way: nothing to invoke.
    let Some(handler) = resolve(commands, name).and_then(|spec| spec.handler(kind)) else {
        log::warn!("unknown command {name:?} ({kind})");
        transport.write_line(RESPONSE_ERROR);
        return Err(EngineError::UnknownCommand {
            name: name.to_string(),
            kind,
        });
    };

    let tokens = match params {
        Some(params) => Tokens::new(params),
        None => Tokens::empty(),
    };

    let mut ctx = Context {
        name,
        kind,
        tokens,
        transport: &mut *transport,
    };
    let succeeded = handler(&mut ctx);

    if succeeded {
        log::debug!("{kind} {name:?} handled");
        transport.write_line(RESPONSE_OK);
        Ok(())
    } else {
        log::debug!("{kind} {name:?} rejected by handler");
        transport.write_line(RESPONSE_ERROR);
        Err(EngineError::HandlerFailed {
            name: name.to_string(),
        })
    }
}
