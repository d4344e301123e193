//! # mailforge-smtp
//!
//! SMTP delivery for [`mailforge_mime::Message`].
//!
//! ## Features
//!
//! - **Transport**: [`SmtpTransport`] implements [`mailforge_mime::Transport`]
//! - **Type-state client**: compile-time enforcement of the SMTP command order
//! - **TLS**: implicit TLS, required STARTTLS, or opportunistic STARTTLS
//! - **Authentication**: PLAIN, LOGIN
//! - **Extensions**: SIZE, 8BITMIME
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailforge_mime::Message;
//! use mailforge_smtp::{Credentials, SmtpTransport};
//!
//! #[tokio::main]
//! async fn main() -> mailforge_smtp::Result<()> {
//!     let mut message = Message::new();
//!     message.add_recipient("recipient@example.com");
//!     message.set_from("Sender <sender@example.com>");
//!     message.set_subject("Hello");
//!     message.add_text_body("Hello, World!");
//!
//!     let transport = SmtpTransport::new();
//!     let auth = Some(Credentials::new("sender@example.com", "password"));
//!     message.send(&transport, "smtp.example.com:587", &auth).await
//! }
//! ```
//!
//! ## Connection States
//!
//! ```text
//! ┌──────────────┐
//! │  Connected   │ ─── auth_plain() / auth_login() ───→ Authenticated
//! └──────────────┘                                           │
//!        │                                                   │
//!        └─── mail_from() ───→ MailTransaction ←─────────────┘
//!                                   │
//!                              rcpt_to() ───→ RecipientAdded ─── data() ───→ Data
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
mod config;
pub mod connection;
mod error;
pub mod parser;
mod transport;
pub mod types;

pub use config::{Security, SmtpConfig, SmtpConfigBuilder};
pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
};
pub use error::{Error, Result};
pub use transport::{Credentials, SmtpTransport};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
