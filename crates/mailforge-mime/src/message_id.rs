//! Content-derived message identifiers.
//!
//! The identifier is a SHA-1 digest of a length-prefixed dump of the message
//! fields. It names the multipart boundary; it is not a security token.

use sha1::{Digest, Sha1};
use std::fmt;

/// Length of an identifier in hex characters (160 bits).
pub const IDENTIFIER_LEN: usize = 40;

/// Accumulates message fields into an identifier.
///
/// Every string is written with its byte length in front, and every list with
/// its item count, so that field boundaries cannot shift between messages
/// (`["ab"]` and `["a", "b"]` hash differently).
#[derive(Clone, Default)]
pub struct IdentifierHasher {
    hasher: Sha1,
}

impl fmt::Debug for IdentifierHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierHasher").finish_non_exhaustive()
    }
}

impl IdentifierHasher {
    /// Creates an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one string field.
    pub fn write_str(&mut self, value: &str) {
        self.write_count(value.len());
        self.hasher.update(value.as_bytes());
    }

    /// Adds a list field.
    pub fn write_list<S: AsRef<str>>(&mut self, values: &[S]) {
        self.write_count(values.len());
        for value in values {
            self.write_str(value.as_ref());
        }
    }

    /// Adds a count, such as the number of entries of a compound field.
    pub fn write_count(&mut self, count: usize) {
        self.hasher.update((count as u64).to_be_bytes());
    }

    /// Returns the identifier as lowercase hex.
    #[must_use]
    pub fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}
