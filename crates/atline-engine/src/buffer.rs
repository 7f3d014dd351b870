//! Fixed-capacity line accumulation and terminator detection.
//!
//! The buffer and the terminator matcher operate in lock-step: every incoming
//! byte is first checked against the capacity ceiling, then stored (unless it
//! is a line-ending byte), and finally run through the incremental terminator
//! match. This keeps the whole path O(1) per byte with no backtracking, so a
//! command may arrive fragmented across arbitrarily many reads.

use bytes::BytesMut;

/// Default capacity for the working line buffer.
pub const DEFAULT_LINE_CAPACITY: usize = 160;

/// Default command terminator.
pub const DEFAULT_TERMINATOR: &[u8] = b"\r\n";

/// Outcome of feeding one byte to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Push {
    /// Byte consumed; the command is still incomplete.
    Pending,
    /// The terminator sequence just completed; the buffered line is ready.
    Complete,
    /// The buffer was already full; the in-progress command must be discarded.
    Overflow,
}

/// The working buffer for one in-flight command line.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    buf: BytesMut,
    capacity: usize,
    terminator: Vec<u8>,
    /// Progress of the partial terminator match.
    term_pos: usize,
}

impl LineBuffer {
    /// Create a buffer with a fixed capacity ceiling and terminator sequence.
    ///
    /// The terminator must not be empty.
    pub fn new(capacity: usize, terminator: Vec<u8>) -> Self {
        assert!(!terminator.is_empty(), "terminator must not be empty");
        LineBuffer {
            buf: BytesMut::with_capacity(capacity),
            capacity,
            terminator,
            term_pos: 0,
        }
    }

    /// Feed one incoming byte.
    ///
    /// Carriage return and line feed are consumed but never stored, so they
    /// do not count against capacity. The capacity gate applies to every
    /// incoming byte, stored or not.
    pub fn push(&mut self, byte: u8) -> Push {
        if self.buf.len() == self.capacity {
            return Push::Overflow;
        }

        if byte != b'\r' && byte != b'\n' {
            self.buf.extend_from_slice(&[byte]);
        }

        if self.terminator[self.term_pos] != byte {
            // A mismatch may itself be the start of a new terminator match.
            self.term_pos = 0;
            if self.terminator[self.term_pos] != byte {
                return Push::Pending;
            }
        }

        self.term_pos += 1;
        if self.term_pos == self.terminator.len() {
            self.term_pos = 0;
            return Push::Complete;
        }
        Push::Pending
    }

    /// Discard the buffered line and all match progress. Idempotent.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.term_pos = 0;
    }

    /// The buffered line content so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Configured capacity ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Progress of the partial terminator match.
    pub fn terminator_progress(&self) -> usize {
        self.term_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crlf_buffer(capacity: usize) -> LineBuffer {
        LineBuffer::new(capacity, DEFAULT_TERMINATOR.to_vec())
    }

    fn push_all(buffer: &mut LineBuffer, bytes: &[u8]) -> Push {
        let mut last = Push::Pending;
        for &b in bytes {
            last = buffer.push(b);
        }
        last
    }

    #[test]
    fn test_accumulates_until_terminator() {
        let mut buffer = crlf_buffer(32);

        assert_eq!(push_all(&mut buffer, b"AT+PING"), Push::Pending);
        assert_eq!(buffer.push(b'\r'), Push::Pending);
        assert_eq!(buffer.push(b'\n'), Push::Complete);
        assert_eq!(buffer.as_bytes(), b"AT+PING");
    }

    #[test]
    fn test_line_endings_never_stored() {
        let mut buffer = crlf_buffer(32);

        push_all(&mut buffer, b"AT\r\n");
        assert_eq!(buffer.as_bytes(), b"AT");
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_overflow_at_capacity() {
        let mut buffer = crlf_buffer(4);

        assert_eq!(push_all(&mut buffer, b"ABCD"), Push::Pending);
        assert_eq!(buffer.push(b'E'), Push::Overflow);
        // The capacity gate applies to line-ending bytes too.
        assert_eq!(buffer.push(b'\r'), Push::Overflow);
    }

    #[test]
    fn test_mismatch_resets_partial_match() {
        let mut buffer = crlf_buffer(32);

        buffer.push(b'\r');
        assert_eq!(buffer.terminator_progress(), 1);
        buffer.push(b'X');
        assert_eq!(buffer.terminator_progress(), 0);
    }

    #[test]
    fn test_repeated_cr_still_completes() {
        // "\r\r\n" resets once at the repeated CR, then matches from it.
        let mut buffer = crlf_buffer(32);

        push_all(&mut buffer, b"AT");
        assert_eq!(buffer.push(b'\r'), Push::Pending);
        assert_eq!(buffer.push(b'\r'), Push::Pending);
        assert_eq!(buffer.push(b'\n'), Push::Complete);
        assert_eq!(buffer.as_bytes(), b"AT");
    }

    #[test]
    fn test_reset_clears_content_and_progress() {
        let mut buffer = crlf_buffer(32);

        push_all(&mut buffer, b"AT+X\r");
        buffer.reset();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.terminator_progress(), 0);

        // Idempotent.
        buffer.reset();
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_single_byte_terminator() {
        let mut buffer = LineBuffer::new(32, vec![b'\n']);

        assert_eq!(push_all(&mut buffer, b"AT+X"), Push::Pending);
        assert_eq!(buffer.push(b'\n'), Push::Complete);
        assert_eq!(buffer.as_bytes(), b"AT+X");
    }

    #[test]
    fn test_stray_lf_completes_nothing_with_crlf() {
        let mut buffer = crlf_buffer(32);

        push_all(&mut buffer, b"AT");
        assert_eq!(buffer.push(b'\n'), Push::Pending);
        assert_eq!(buffer.terminator_progress(), 0);
    }
}
