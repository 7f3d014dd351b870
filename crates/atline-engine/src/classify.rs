//! Command classification and lexing.
//!
//! Once a terminator completes, the accumulated line is scanned exactly once,
//! left to right, starting after the `AT` prefix. The first determining
//! character wins:
//!
//! ```text
//! AT+FOO      -> RUN    (end of content, no determiner)
//! AT+FOO?     -> READ   (bare '?')
//! AT+FOO=?    -> TEST   ('=' immediately followed by '?')
//! AT+FOO=1,2  -> WRITE  ('=', parameters follow)
//! ```
//!
//! Scanning stops at the determiner; for WRITE commands everything after the
//! `=` is the parameter region and is not inspected here.

use std::fmt;
use std::ops::Range;

/// Required prefix of every non-empty command line.
pub(crate) const COMMAND_PREFIX: &[u8] = b"AT";

/// The four classified command forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Bare command with no parameters (`AT+FOO`).
    Run,
    /// Query of current state (`AT+FOO?`).
    Read,
    /// Query of accepted parameters (`AT+FOO=?`).
    Test,
    /// Command supplying comma-separated parameters (`AT+FOO=1,2`).
    Write,
}

impl CommandKind {
    /// Uppercase label for the command form.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Run => "RUN",
            CommandKind::Read => "READ",
            CommandKind::Test => "TEST",
            CommandKind::Write => "WRITE",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one accumulated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Classified {
    /// Empty line: acknowledged without dispatch.
    Ping,
    /// A well-formed command with its name and parameter regions.
    Command {
        kind: CommandKind,
        /// Byte range of the command name within the line.
        name: Range<usize>,
        /// Byte range of the WRITE parameter region, if any.
        params: Option<Range<usize>>,
    },
}

/// Reason a line failed classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyntaxError {
    /// The line does not start with the `AT` prefix.
    MissingPrefix,
    /// A byte outside the allowed command character set.
    InvalidCharacter { position: usize, byte: u8 },
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::MissingPrefix => write!(f, "missing AT prefix"),
            SyntaxError::InvalidCharacter { position, byte } => {
                write!(f, "invalid byte 0x{byte:02X} at offset {position}")
            }
        }
    }
}

/// Allowed characters in the command region (between prefix and determiner).
fn is_command_char(byte: u8) -> bool {
    byte.is_ascii_uppercase()
        || byte.is_ascii_digit()
        || matches!(byte, b'+' | b'#' | b'$' | b'@' | b'_' | b'=' | b'?')
}

/// Classify one accumulated line.
pub(crate) fn classify(line: &[u8]) -> Result<Classified, SyntaxError> {
    if line.is_empty() {
        return Ok(Classified::Ping);
    }

    if !line.starts_with(COMMAND_PREFIX) {
        return Err(SyntaxError::MissingPrefix);
    }

    let start = COMMAND_PREFIX.len();
    for (i, &byte) in line.iter().enumerate().skip(start) {
        if !is_command_char(byte) {
            return Err(SyntaxError::InvalidCharacter { position: i, byte });
        }

        match byte {
            b'=' => {
                // TEST is `=` immediately followed by `?`; anything else
                // after `=` (including nothing) is a WRITE parameter region.
                return if line.get(i + 1) == Some(&b'?') {
                    Ok(Classified::Command {
                        kind: CommandKind::Test,
                        name: start..i,
                        params: None,
                    })
                } else {
                    Ok(Classified::Command {
                        kind: CommandKind::Write,
                        name: start..i,
                        params: Some(i + 1..line.len()),
                    })
                };
            }
            b'?' => {
                return Ok(Classified::Command {
                    kind: CommandKind::Read,
                    name: start..i,
                    params: None,
                });
            }
            _ => {}
        }
    }

    // End of content with no determiner: bare RUN form.
    Ok(Classified::Command {
        kind: CommandKind::Run,
        name: start..line.len(),
        params: None,
    })
}
