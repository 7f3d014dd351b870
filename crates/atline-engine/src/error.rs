//! Error types for the command engine.

use thiserror::Error;

use crate::classify::CommandKind;

/// Errors reported by [`AtEngine::service`](crate::AtEngine::service).
///
/// Every variant is handled locally: by the time `service` returns one of
/// these, the failure response (if any) has been written and the line buffer
/// has been reset, so the next cycle starts clean.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No transport is attached to the engine.
    #[error("no transport attached")]
    TransportUnavailable,

    /// Incoming bytes exceeded the line buffer before a terminator was seen.
    #[error("line buffer overflow: capacity {capacity} bytes")]
    BufferOverflow {
        /// Configured buffer capacity.
        capacity: usize,
    },

    /// The accumulated line failed classification (missing `AT` prefix or an
    /// invalid character in the command region).
    #[error("syntax error in command line {line:?}")]
    Syntax {
        /// The rejected line, lossily decoded for diagnostics.
        line: String,
    },

    /// The classified name has no table entry, or the matching entry has no
    /// handler for the classified command form.
    #[error("unknown command {name:?} ({kind})")]
    UnknownCommand {
        /// The command name that failed to resolve.
        name: String,
        /// The classified command form.
        kind: CommandKind,
    },

    /// The invoked handler reported failure.
    #[error("handler rejected command {name:?}")]
    HandlerFailed {
        /// The command name whose handler returned `false`.
        name: String,
    },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
