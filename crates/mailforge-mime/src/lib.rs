//! # mailforge-mime
//!
//! RFC 5322 message construction with `multipart/alternative` bodies.
//!
//! ## Features
//!
//! - **Message builder**: append-only recipients and bodies, deterministic
//!   formatting with folded headers
//! - **Transfer encoding**: pluggable [`TransferEncoder`], Quoted-Printable by
//!   default, Base64 available
//! - **Boundaries**: derived from a SHA-1 identifier of the message content
//! - **Delivery**: [`Message::send`] hands the formatted bytes to any
//!   [`Transport`]
//! - **Reading**: [`ParsedMessage`] reads the produced wire format back
//!
//! ## Quick Start
//!
//! ```
//! use mailforge_mime::{Message, ParsedMessage};
//!
//! let mut message = Message::new();
//! message.add_recipient("recipient@example.com");
//! message.set_from("Sender <sender@example.com>");
//! message.set_subject("Test Message");
//! message.add_text_body("Plain text version");
//! message.add_html_body("<h1>HTML version</h1>");
//!
//! let bytes = message.format();
//!
//! let parsed = ParsedMessage::parse(&String::from_utf8(bytes).unwrap()).unwrap();
//! assert_eq!(parsed.subject(), Some("Test Message"));
//! assert_eq!(parsed.text_part().unwrap(), "Plain text version");
//! ```
//!
//! ### Choosing an encoder
//!
//! ```
//! use mailforge_mime::{Base64, Message};
//!
//! let mut message = Message::with_encoder(Base64);
//! message.add_text_body("Hello");
//! let text = String::from_utf8(message.format()).unwrap();
//! assert!(text.contains("Content-Transfer-Encoding: base64"));
//! ```
//!
//! ### Sending
//!
//! ```ignore
//! use mailforge_smtp::{Credentials, SmtpTransport};
//!
//! let transport = SmtpTransport::default();
//! let auth = Some(Credentials::new("user@example.com", "password"));
//! message.send(&transport, "smtp.example.com:587", &auth).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod encoder;
mod error;
mod header;
mod message;
mod parsed;
mod transport;

pub mod encoding;
pub mod fold;
pub mod message_id;

pub use content_type::ContentType;
pub use encoder::{Base64, QuotedPrintable, TransferEncoder};
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{BodyPart, DATE_FORMAT, Message, format_mailbox};
pub use parsed::{ParsedMessage, Part, TransferEncoding};
pub use transport::Transport;
