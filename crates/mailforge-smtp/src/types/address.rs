//! Envelope addresses.

use crate::error::{Error, Result};
use std::fmt;

/// Address used in `MAIL FROM` / `RCPT TO`.
///
/// Only the shape SMTP needs is checked: one `@` with text on both sides and
/// no angle brackets or whitespace. Anything finer is the relay's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a bare `local@domain` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty or malformed.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Extracts the envelope address from a header mailbox.
    ///
    /// Accepts `Name <local@domain>` as well as a bare address.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable address is found.
    pub fn from_mailbox(mailbox: &str) -> Result<Self> {
        let mailbox = mailbox.trim();
        let addr = match (mailbox.rfind('<'), mailbox.rfind('>')) {
            (Some(open), Some(close)) if open < close => &mailbox[open + 1..close],
            (None, None) => mailbox,
            _ => {
                return Err(Error::InvalidAddress(format!(
                    "Unbalanced angle brackets: {mailbox}"
                )));
            }
        };
        Self::new(addr.trim())
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if addr.contains(|c: char| c.is_whitespace() || c == '<' || c == '>') {
            return Err(Error::InvalidAddress(format!(
                "Address contains whitespace or brackets: {addr}"
            )));
        }

        match addr.rsplit_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(Error::InvalidAddress(format!(
                "Address must be local@domain: {addr}"
            ))),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
