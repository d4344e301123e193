//! Mail transport capability.
//!
//! [`Message::send`](crate::Message::send) formats the message and hands the
//! bytes to a [`Transport`]. The SMTP implementation lives in the
//! `mailforge-smtp` crate; tests and other delivery paths can supply their
//! own.

use std::future::Future;

/// Delivers a formatted message to a mail relay.
pub trait Transport {
    /// Credential type accepted by [`send`](Self::send).
    type Auth;
    /// Error returned when delivery fails.
    type Error;

    /// Sends `message` from `from` to every mailbox in `to` via the relay at
    /// `address`.
    ///
    /// The message buffer is already RFC 5322 formatted with CRLF line
    /// endings.
    fn send(
        &self,
        address: &str,
        auth: &Self::Auth,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
