//! Message builder and RFC 5322 formatting.

use crate::content_type::ContentType;
use crate::encoder::{QuotedPrintable, TransferEncoder};
use crate::fold::{MAX_LINE_WIDTH, fold};
use crate::message_id::IdentifierHasher;
use crate::transport::Transport;
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

/// `Date` header layout (RFC 5322 §3.3 with a numeric zone).
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Formats a mailbox for use in address headers.
///
/// Returns `Name <address>`, or the bare address when `name` is empty.
///
/// ```
/// use mailforge_mime::format_mailbox;
///
/// assert_eq!(format_mailbox("jo@example.com", "Jo"), "Jo <jo@example.com>");
/// assert_eq!(format_mailbox("jo@example.com", ""), "jo@example.com");
/// ```
#[must_use]
pub fn format_mailbox(address: &str, name: &str) -> String {
    if name.is_empty() {
        address.to_string()
    } else {
        format!("{name} <{address}>")
    }
}

/// One alternative representation of the message body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyPart {
    mime_type: String,
    text: String,
}

impl BodyPart {
    /// Creates a body part. An empty `mime_type` omits the part's
    /// `Content-Type` header.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            text: text.into(),
        }
    }

    /// Returns the MIME type, e.g. `text/plain; charset=utf-8`.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the unencoded body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// An email message under construction.
///
/// Recipients and bodies are append-only; the output lists them in insertion
/// order. Every body is written as one part of a `multipart/alternative`
/// body and encoded with the message's [`TransferEncoder`].
///
/// ```
/// use mailforge_mime::Message;
///
/// let mut message = Message::new();
/// message.add_recipient("a@x.com");
/// message.set_from("b@x.com");
/// message.set_subject("Hi");
/// message.add_text_body("Hello");
///
/// let bytes = message.format();
/// let text = String::from_utf8(bytes).unwrap();
/// assert!(text.starts_with("To: a@x.com\r\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Message<E = QuotedPrintable> {
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    from: String,
    subject: String,
    bodies: Vec<BodyPart>,
    encoder: E,
}

impl Message<QuotedPrintable> {
    /// Creates an empty message using Quoted-Printable body encoding.
    #[must_use]
    pub fn new() -> Self {
        Self::with_encoder(QuotedPrintable)
    }
}

impl<E: TransferEncoder> Message<E> {
    /// Creates an empty message using the given body encoder.
    #[must_use]
    pub const fn with_encoder(encoder: E) -> Self {
        Self {
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            from: String::new(),
            subject: String::new(),
            bodies: Vec::new(),
            encoder,
        }
    }

    /// Adds a `To` recipient.
    pub fn add_recipient(&mut self, mailbox: impl Into<String>) {
        self.to.push(mailbox.into());
    }

    /// Adds a `Cc` recipient.
    pub fn add_cc(&mut self, mailbox: impl Into<String>) {
        self.cc.push(mailbox.into());
    }

    /// Adds a `Bcc` recipient.
    pub fn add_bcc(&mut self, mailbox: impl Into<String>) {
        self.bcc.push(mailbox.into());
    }

    /// Sets the sender mailbox.
    pub fn set_from(&mut self, mailbox: impl Into<String>) {
        self.from = mailbox.into();
    }

    /// Sets the subject line.
    ///
    /// Line breaks are written as spaces.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Adds a body of any MIME type.
    pub fn add_body(&mut self, mime_type: impl Into<String>, text: impl Into<String>) {
        self.bodies.push(BodyPart::new(mime_type, text));
    }

    /// Adds an HTML body using the utf-8 charset.
    pub fn add_html_body(&mut self, text: impl Into<String>) {
        self.add_body(ContentType::text_html().to_string(), text);
    }

    /// Adds a plain text body using the utf-8 charset.
    pub fn add_text_body(&mut self, text: impl Into<String>) {
        self.add_body(ContentType::text_plain().to_string(), text);
    }

    /// `To` recipients in insertion order.
    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// `Cc` recipients in insertion order.
    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// `Bcc` recipients in insertion order.
    #[must_use]
    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    /// Sender mailbox.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Bodies in insertion order.
    #[must_use]
    pub fn bodies(&self) -> &[BodyPart] {
        &self.bodies
    }

    /// Body encoder.
    #[must_use]
    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Derives the message identifier from the current content.
    ///
    /// The result is 40 lowercase hex characters. It changes whenever any
    /// field changes and is stable otherwise.
    #[must_use]
    pub fn message_id(&self) -> String {
        let mut hasher = IdentifierHasher::new();
        hasher.write_list(&self.to);
        hasher.write_list(&self.cc);
        hasher.write_list(&self.bcc);
        hasher.write_str(&self.from);
        hasher.write_str(&self.subject);
        hasher.write_count(self.bodies.len());
        for body in &self.bodies {
            hasher.write_str(&body.mime_type);
            hasher.write_str(&body.text);
        }
        hasher.write_str(self.encoder.label());
        hasher.finish()
    }

    /// Formats the message per RFC 5322, dated now.
    #[must_use]
    pub fn format(&self) -> Vec<u8> {
        self.format_at(&Local::now())
    }

    /// Formats the message per RFC 5322 with the given `Date`.
    ///
    /// Output for the same message and date is byte-for-byte identical.
    #[must_use]
    pub fn format_at<Tz>(&self, date: &DateTime<Tz>) -> Vec<u8>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let id = self.message_id();
        let mut formatted = FormattedMessage::new(format!("=_{id}"), &self.encoder);

        formatted.add_header("To", &self.to.join(", "));
        formatted.add_header("Cc", &self.cc.join(", "));
        formatted.add_header("Bcc", &self.bcc.join(", "));
        formatted.add_header("From", &self.from);
        formatted.add_header("Subject", &self.subject);
        formatted.add_header("Date", &date.format(DATE_FORMAT).to_string());
        let content_type = ContentType::multipart_alternative(formatted.boundary.as_str());
        formatted.add_header("Content-Type", &content_type.to_string());
        formatted.add_header("MIME-Version", "1.0");

        for body in &self.bodies {
            formatted.add_body(body);
        }

        let buffer = formatted.finish();
        tracing::debug!(
            id = %id,
            parts = self.bodies.len(),
            size = buffer.len(),
            "Formatted message"
        );
        buffer
    }

    /// Formats the message and hands it to `transport` for delivery to the
    /// `To` recipients.
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged. Nothing is retried.
    pub async fn send<T: Transport>(
        &self,
        transport: &T,
        address: &str,
        auth: &T::Auth,
    ) -> Result<(), T::Error> {
        let message = self.format();
        tracing::debug!(
            address,
            from = %self.from,
            recipients = self.to.len(),
            size = message.len(),
            "Sending message"
        );
        transport
            .send(address, auth, &self.from, &self.to, &message)
            .await
    }
}

/// Output buffer for one [`Message::format_at`] call.
struct FormattedMessage<'a, E> {
    buffer: Vec<u8>,
    boundary: String,
    encoder: &'a E,
    parts: usize,
}

impl<'a, E: TransferEncoder> FormattedMessage<'a, E> {
    const fn new(boundary: String, encoder: &'a E) -> Self {
        Self {
            buffer: Vec::new(),
            boundary,
            encoder,
            parts: 0,
        }
    }

    /// Writes a folded header line; empty values write nothing.
    fn add_header(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        let line = fold(MAX_LINE_WIDTH, &format!("{field}: "), value);
        self.buffer.extend_from_slice(line.as_bytes());
    }

    /// Writes one boundary-delimited part.
    fn add_body(&mut self, body: &BodyPart) {
        let encoder = self.encoder;

        self.write_delimiter();
        self.buffer.extend_from_slice(b"\r\n");
        self.add_header("Content-Type", &body.mime_type);
        self.add_header("Content-Transfer-Encoding", encoder.label());
        self.buffer.extend_from_slice(b"\r\n");

        let encoded = encoder.encode(body.text.as_bytes());
        self.buffer.extend_from_slice(&encoded);
        self.buffer.extend_from_slice(b"\r\n");
        self.parts += 1;
    }

    fn write_delimiter(&mut self) {
        self.buffer.extend_from_slice(b"\r\n--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
    }

    /// Closes the multipart body and returns the buffer.
    fn finish(mut self) -> Vec<u8> {
        if self.parts > 0 {
            self.write_delimiter();
            self.buffer.extend_from_slice(b"--\r\n");
        }
        self.buffer
    }
}
