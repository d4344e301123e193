//! Relay connection with a type-state client.

mod client;
mod stream;

pub use client::{Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::types::{AuthMechanism, Extension};
use std::collections::HashSet;

/// What the relay told us about itself.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// Hostname from the greeting.
    pub hostname: String,
    /// Extensions from the latest EHLO reply.
    pub extensions: HashSet<Extension>,
}

impl ServerInfo {
    /// Checks if the server supports an extension.
    #[must_use]
    pub fn supports(&self, ext: &Extension) -> bool {
        self.extensions.contains(ext)
    }

    /// Checks if STARTTLS is supported.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports(&Extension::StartTls)
    }

    /// Checks if 8BITMIME is supported.
    #[must_use]
    pub fn supports_8bitmime(&self) -> bool {
        self.supports(&Extension::EightBitMime)
    }

    /// Returns true if the SIZE extension was advertised at all.
    #[must_use]
    pub fn supports_size(&self) -> bool {
        self.extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Size(_)))
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }

    /// Returns the advertised authentication mechanisms we can use, or
    /// `None` when AUTH was not advertised.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Option<&[AuthMechanism]> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(lines: &[&str]) -> ServerInfo {
        ServerInfo {
            hostname: "relay.example.com".into(),
            extensions: lines.iter().map(|line| Extension::parse(line)).collect(),
        }
    }

    #[test]
    fn test_capabilities() {
        let info = info(&["STARTTLS", "8BITMIME", "SIZE 1000", "AUTH LOGIN PLAIN"]);
        assert!(info.supports_starttls());
        assert!(info.supports_8bitmime());
        assert!(info.supports_size());
        assert_eq!(info.max_message_size(), Some(1000));
        assert_eq!(
            info.auth_mechanisms(),
            Some([AuthMechanism::Login, AuthMechanism::Plain].as_slice())
        );
    }

    #[test]
    fn test_nothing_advertised() {
        let info = info(&["PIPELINING"]);
        assert!(!info.supports_starttls());
        assert!(!info.supports_size());
        assert_eq!(info.max_message_size(), None);
        assert_eq!(info.auth_mechanisms(), None);
    }

    #[test]
    fn test_size_without_limit() {
        let info = info(&["SIZE"]);
        assert!(info.supports_size());
        assert_eq!(info.max_message_size(), None);
    }
}
