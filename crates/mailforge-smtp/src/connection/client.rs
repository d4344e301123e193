//! Type-state SMTP client.
//!
//! Each state only exposes the commands that are valid in it, so an
//! out-of-order transaction does not compile.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;

/// Greeting received, EHLO possibly sent.
#[derive(Debug)]
pub struct Connected;

/// AUTH succeeded.
#[derive(Debug)]
pub struct Authenticated;

/// MAIL FROM accepted.
#[derive(Debug)]
pub struct MailTransaction;

/// At least one RCPT TO accepted.
#[derive(Debug)]
pub struct RecipientAdded;

/// DATA accepted, waiting for the message.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    helo_name: String,
    _state: PhantomData<State>,
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(greeting.into_error());
        }

        let hostname = greeting
            .lines
            .first()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
            helo_name: String::new(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.helo_name = client_hostname.to_string();
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS and repeats EHLO.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not supported or if the upgrade fails.
    pub async fn starttls(mut self, server_name: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.expect_code(Command::StartTls, ReplyCode::SERVICE_READY).await?;
        self.stream = self.stream.upgrade_to_tls(server_name).await?;

        // Capabilities learned before the handshake are discarded (RFC 3207).
        self.send_ehlo().await?;
        Ok(self)
    }

    /// Authenticates with AUTH PLAIN.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let encoded = STANDARD.encode(format!("\0{username}\0{password}"));
        self.expect_code(
            Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(encoded),
            },
            ReplyCode::AUTH_SUCCESS,
        )
        .await?;

        tracing::debug!(mechanism = "PLAIN", "Authenticated");
        Ok(self.transition())
    }

    /// Authenticates with AUTH LOGIN.
    ///
    /// # Errors
    ///
    /// Returns an error if a challenge is missing or authentication fails.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        self.expect_code(
            Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            },
            ReplyCode::AUTH_CONTINUE,
        )
        .await?;
        self.expect_code(
            Command::AuthResponse(STANDARD.encode(username)),
            ReplyCode::AUTH_CONTINUE,
        )
        .await?;
        self.expect_code(
            Command::AuthResponse(STANDARD.encode(password)),
            ReplyCode::AUTH_SUCCESS,
        )
        .await?;

        tracing::debug!(mechanism = "LOGIN", "Authenticated");
        Ok(self.transition())
    }

    /// Starts a mail transaction without authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(
        self,
        from: Address,
        size: usize,
        eight_bit: bool,
    ) -> Result<Client<MailTransaction>> {
        self.start_mail(from, size, eight_bit).await
    }

    async fn send_ehlo(&mut self) -> Result<()> {
        let hostname = self.helo_name.clone();
        let reply = self.send_command(Command::Ehlo { hostname }).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }

        // First line is the relay's own greeting.
        self.server_info.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        tracing::debug!(extensions = ?self.server_info.extensions, "EHLO accepted");
        Ok(())
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// `size` is declared only when the relay supports SIZE, and
    /// `BODY=8BITMIME` only when requested and supported.
    ///
    /// # Errors
    ///
    /// Returns an error if the MAIL FROM command fails.
    pub async fn mail_from(
        self,
        from: Address,
        size: usize,
        eight_bit: bool,
    ) -> Result<Client<MailTransaction>> {
        self.start_mail(from, size, eight_bit).await
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self)
    }

    /// Sends DATA.
    ///
    /// # Errors
    ///
    /// Returns an error unless the relay answers 354.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.expect_code(Command::Data, ReplyCode::START_DATA).await?;
        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Transmits the message and the terminating `.` line.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the relay rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Connected>> {
        self.stream.write_all(&dot_stuff(message)).await?;

        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            tracing::warn!(code = reply.code.as_u16(), text = %reply.text(), "Message rejected");
            return Err(reply.into_error());
        }

        tracing::debug!(bytes = message.len(), "Message accepted");
        Ok(self.transition())
    }
}

impl<S> Client<S> {
    /// Returns what the relay advertised.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns true once the connection is encrypted.
    #[must_use]
    pub const fn is_encrypted(&self) -> bool {
        self.stream.is_tls()
    }

    /// Sends QUIT and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if !reply.is_success() {
            return Err(reply.into_error());
        }
        Ok(())
    }

    async fn start_mail(
        mut self,
        from: Address,
        size: usize,
        eight_bit: bool,
    ) -> Result<Client<MailTransaction>> {
        let command = Command::MailFrom {
            from,
            size: self.server_info.supports_size().then_some(size),
            eight_bit: eight_bit && self.server_info.supports_8bitmime(),
        };
        self.expect_success(command).await?;
        Ok(self.transition())
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            helo_name: self.helo_name,
            _state: PhantomData,
        }
    }

    async fn send_command(&mut self, command: Command) -> Result<Reply> {
        tracing::trace!(command = command.verb(), "SMTP >");
        self.stream.write_all(&command.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        tracing::trace!(code = reply.code.as_u16(), "SMTP <");
        Ok(reply)
    }

    async fn expect_success(&mut self, command: Command) -> Result<Reply> {
        let verb = command.verb();
        let reply = self.send_command(command).await?;
        if !reply.is_success() {
            tracing::warn!(command = verb, code = reply.code.as_u16(), text = %reply.text(), "Command rejected");
            return Err(reply.into_error());
        }
        Ok(reply)
    }

    async fn expect_code(&mut self, command: Command, code: ReplyCode) -> Result<Reply> {
        let verb = command.verb();
        let reply = self.send_command(command).await?;
        if reply.code != code {
            tracing::warn!(command = verb, code = reply.code.as_u16(), text = %reply.text(), "Command rejected");
            return Err(reply.into_error());
        }
        Ok(reply)
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }
    parse_reply(&lines)
}

/// Normalizes line endings to CRLF, doubles leading dots and appends the
/// `.` terminator.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let mut out = Vec::with_capacity(message.len() + message.len() / 64 + 5);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_stuff_terminates() {
        assert_eq!(dot_stuff(b"Hello\r\n"), b"Hello\r\n.\r\n");
        assert_eq!(dot_stuff(b"Hello"), b"Hello\r\n.\r\n");
    }

    #[test]
    fn test_dot_stuff_leading_dots() {
        assert_eq!(
            dot_stuff(b"a\r\n.\r\n..b\r\nc.d\r\n"),
            b"a\r\n..\r\n...b\r\nc.d\r\n.\r\n"
        );
    }

    #[test]
    fn test_dot_stuff_normalizes_bare_lf() {
        assert_eq!(dot_stuff(b"a\nb\r\nc\n"), b"a\r\nb\r\nc\r\n.\r\n");
    }

    #[test]
    fn test_dot_stuff_keeps_blank_lines() {
        assert_eq!(dot_stuff(b"a\r\n\r\nb\r\n"), b"a\r\n\r\nb\r\n.\r\n");
    }
}
