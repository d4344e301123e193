//! Client commands.

use crate::types::{Address, AuthMechanism};

/// Command line sent to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO
    Ehlo {
        /// Name the client announces.
        hostname: String,
    },
    /// STARTTLS
    StartTls,
    /// AUTH, optionally with an initial response
    Auth {
        /// Mechanism to start.
        mechanism: AuthMechanism,
        /// Base64 initial response.
        initial_response: Option<String>,
    },
    /// Base64 answer to a 334 challenge.
    AuthResponse(String),
    /// MAIL FROM
    MailFrom {
        /// Envelope sender.
        from: Address,
        /// Declared message size, sent when the relay supports SIZE.
        size: Option<usize>,
        /// Declare `BODY=8BITMIME`.
        eight_bit: bool,
    },
    /// RCPT TO
    RcptTo {
        /// Envelope recipient.
        to: Address,
    },
    /// DATA
    Data,
    /// QUIT
    Quit,
}

impl Command {
    /// Serializes the command, including the trailing CRLF.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut line = match self {
            Self::Ehlo { hostname } => format!("EHLO {hostname}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(response),
            } => format!("AUTH {} {response}", mechanism.as_str()),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => format!("AUTH {}", mechanism.as_str()),
            Self::AuthResponse(response) => response.clone(),
            Self::MailFrom {
                from,
                size,
                eight_bit,
            } => {
                let mut line = format!("MAIL FROM:<{from}>");
                if *eight_bit {
                    line.push_str(" BODY=8BITMIME");
                }
                if let Some(size) = size {
                    line.push_str(&format!(" SIZE={size}"));
                }
                line
            }
            Self::RcptTo { to } => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Quit => "QUIT".to_string(),
        };
        line.push_str("\r\n");
        line.into_bytes()
    }

    /// Returns the command verb for logging. Never includes credentials.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } => "AUTH",
            Self::AuthResponse(_) => "AUTH (response)",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }
}
