//! Pull-based tokenizer for WRITE command parameters.

use std::iter::FusedIterator;

/// Comma-delimited token iterator over a WRITE command's parameter region.
///
/// Forward-only and non-restartable: once exhausted it stays exhausted for
/// the rest of the cycle. Consecutive commas yield empty tokens, and a
/// trailing comma yields a final empty token, so the total token count is
/// always the comma count plus one.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: Option<&'a str>,
}

impl<'a> Tokens<'a> {
    /// Tokenizer over a parameter region.
    pub(crate) fn new(params: &'a str) -> Self {
        Tokens { rest: Some(params) }
    }

    /// Already-exhausted tokenizer, used for command forms without parameters.
    pub(crate) fn empty() -> Self {
        Tokens { rest: None }
    }

    /// True while at least one token remains.
    pub fn has_next(&self) -> bool {
        self.rest.is_some()
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        match rest.find(',') {
            Some(comma) => {
                self.rest = Some(&rest[comma + 1..]);
                Some(&rest[..comma])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}
