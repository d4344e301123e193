//! [`Transport`] implementation that delivers over SMTP.

use crate::config::{Security, SmtpConfig};
use crate::connection::{self, Client, Connected};
use crate::error::{Error, Result};
use crate::types::{Address, AuthMechanism};
use mailforge_mime::Transport;
use std::fmt;
use std::net::IpAddr;

/// Username and password for SMTP AUTH.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Delivers messages to an SMTP relay, one connection per message.
///
/// ```ignore
/// use mailforge_smtp::{Credentials, Security, SmtpConfig, SmtpTransport};
///
/// let transport = SmtpTransport::with_config(
///     SmtpConfig::builder().security(Security::StartTls).build(),
/// );
/// let auth = Some(Credentials::new("user", "secret"));
/// message.send(&transport, "smtp.example.com:587", &auth).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SmtpTransport {
    config: SmtpConfig,
}

impl SmtpTransport {
    /// Creates a transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport with the given configuration.
    #[must_use]
    pub const fn with_config(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SmtpConfig {
        &self.config
    }

    async fn connect(&self, host: &str, port: u16) -> Result<Client<Connected>> {
        let timeout = self.config.connect_timeout;
        let stream = match self.config.security {
            Security::Tls => connection::connect_tls(host, port, timeout).await?,
            Security::None | Security::StartTls | Security::Opportunistic => {
                connection::connect(host, port, timeout).await?
            }
        };

        let client = Client::from_stream(stream)
            .await?
            .ehlo(&self.config.client_hostname)
            .await?;

        match self.config.security {
            Security::StartTls => client.starttls(host).await,
            Security::Opportunistic if client.server_info().supports_starttls() => {
                client.starttls(host).await
            }
            Security::Opportunistic | Security::None | Security::Tls => Ok(client),
        }
    }
}

impl Transport for SmtpTransport {
    type Auth = Option<Credentials>;
    type Error = Error;

    async fn send(
        &self,
        address: &str,
        auth: &Self::Auth,
        from: &str,
        to: &[String],
        message: &[u8],
    ) -> Result<()> {
        let (host, port) = parse_server_address(address, self.config.security.default_port())?;
        let from = Address::from_mailbox(from)?;
        let recipients = to
            .iter()
            .map(|mailbox| Address::from_mailbox(mailbox))
            .collect::<Result<Vec<_>>>()?;
        let Some((first, rest)) = recipients.split_first() else {
            return Err(Error::NoRecipients);
        };

        let client = self.connect(host, port).await?;

        if let Some(limit) = client.server_info().max_message_size()
            && message.len() > limit
        {
            return Err(Error::MessageTooLarge {
                size: message.len(),
                limit,
            });
        }

        let eight_bit = !message.is_ascii();
        let client = match auth {
            Some(credentials) => {
                check_auth_allowed(client.is_encrypted(), host)?;
                let mechanism = choose_mechanism(client.server_info().auth_mechanisms())?;
                let client = match mechanism {
                    AuthMechanism::Plain => {
                        client
                            .auth_plain(&credentials.username, &credentials.password)
                            .await?
                    }
                    AuthMechanism::Login => {
                        client
                            .auth_login(&credentials.username, &credentials.password)
                            .await?
                    }
                };
                client.mail_from(from, message.len(), eight_bit).await?
            }
            None => client.mail_from(from, message.len(), eight_bit).await?,
        };

        let mut client = client.rcpt_to(first.clone()).await?;
        for recipient in rest {
            client = client.rcpt_to(recipient.clone()).await?;
        }

        let client = client.data().await?.send_message(message).await?;
        tracing::info!(
            relay = %host,
            recipients = recipients.len(),
            size = message.len(),
            "Message delivered"
        );
        client.quit().await
    }
}

/// Splits `host`, `host:port` or `[ipv6]:port`; a missing port is filled
/// with `default_port`.
fn parse_server_address(address: &str, default_port: u16) -> Result<(&str, u16)> {
    let invalid = || Error::InvalidServerAddress(address.to_string());

    let (host, port) = if let Some(rest) = address.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
        match tail {
            "" => (host, None),
            _ => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
        }
    } else {
        match address.rsplit_once(':') {
            // A second colon means a bare IPv6 address without a port.
            Some((host, port)) if !host.contains(':') => (host, Some(port)),
            _ => (address, None),
        }
    };

    if host.is_empty() {
        return Err(invalid());
    }
    let port = match port {
        Some(port) => port.parse().map_err(|_| invalid())?,
        None => default_port,
    };
    Ok((host, port))
}

fn choose_mechanism(offered: Option<&[AuthMechanism]>) -> Result<AuthMechanism> {
    let offered = offered.ok_or_else(|| Error::NotSupported("AUTH".into()))?;
    [AuthMechanism::Plain, AuthMechanism::Login]
        .into_iter()
        .find(|mechanism| offered.contains(mechanism))
        .ok_or_else(|| Error::NotSupported("AUTH PLAIN or LOGIN".into()))
}

/// Credentials only travel over TLS, or in the clear to a loopback relay.
fn check_auth_allowed(encrypted: bool, host: &str) -> Result<()> {
    if encrypted || is_localhost(host) {
        Ok(())
    } else {
        Err(Error::InsecureAuth(host.to_string()))
    }
}

fn is_localhost(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}
