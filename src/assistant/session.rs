use serde::{Deserialize, Serialize};

use super::error::DispatchError;
use super::model::EmailSummary;

/// Per-session inbox snapshot plus navigation cursor.
///
/// Invariants: `cursor < cache.len()` whenever the cache is non-empty, and
/// `cursor == 0` when it is empty. The cache is replaced wholesale on every
/// successful inbox fetch, never merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboxSession {
    cache: Vec<EmailSummary>,
    cursor: usize,
}

impl InboxSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot and reset the cursor.
    pub fn replace(&mut self, emails: Vec<EmailSummary>) {
        self.cache = emails;
        self.cursor = 0;
    }

    pub fn emails(&self) -> &[EmailSummary] {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Result<&EmailSummary, DispatchError> {
        self.cache.get(self.cursor).ok_or(DispatchError::EmptyInbox)
    }

    /// Move forward, saturating at the last email.
    pub fn advance(&mut self) {
        if !self.cache.is_empty() {
            self.cursor = (self.cursor + 1).min(self.cache.len() - 1);
        }
    }

    /// Move backward, saturating at the first email.
    pub fn retreat(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Jump to a 1-based position. Unlike the saturating moves, an out-of-range
    /// number is a user error worth surfacing, so this rejects instead of
    /// clamping and leaves the cursor untouched on failure.
    pub fn jump_to(&mut self, number: u32) -> Result<(), DispatchError> {
        if number < 1 || number as usize > self.cache.len() {
            return Err(DispatchError::OutOfRange {
                number,
                len: self.cache.len(),
            });
        }

        self.cursor = number as usize - 1;
        Ok(())
    }

    /// Restore the cursor invariant after deserializing a snapshot that may
    /// have been written by an older process or edited by hand.
    pub fn repair(&mut self) {
        if self.cursor >= self.cache.len() {
            self.cursor = 0;
        }
    }
}
