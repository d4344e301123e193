//! Transport configuration.

use std::time::Duration;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption (port 25). Credentials are only sent to localhost.
    None,
    /// Plaintext, then STARTTLS; fails if the relay does not offer it (port 587).
    StartTls,
    /// STARTTLS when the relay advertises it, plaintext otherwise (port 587).
    #[default]
    Opportunistic,
    /// TLS from the start (port 465).
    Tls,
}

impl Security {
    /// Returns the port used when the relay address has none.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None => 25,
            Self::StartTls | Self::Opportunistic => 587,
            Self::Tls => 465,
        }
    }
}

/// Settings for [`SmtpTransport`](crate::SmtpTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    /// Security mode.
    pub security: Security,
    /// Name announced in EHLO.
    pub client_hostname: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            security: Security::default(),
            client_hostname: "localhost".to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl SmtpConfig {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder() -> SmtpConfigBuilder {
        SmtpConfigBuilder::default()
    }
}

/// Builder for [`SmtpConfig`].
#[derive(Debug, Clone, Default)]
pub struct SmtpConfigBuilder {
    config: SmtpConfig,
}

impl SmtpConfigBuilder {
    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.config.security = security;
        self
    }

    /// Sets the name announced in EHLO.
    #[must_use]
    pub fn client_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.config.client_hostname = hostname.into();
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> SmtpConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 25);
        assert_eq!(Security::StartTls.default_port(), 587);
        assert_eq!(Security::Opportunistic.default_port(), 587);
        assert_eq!(Security::Tls.default_port(), 465);
    }

    #[test]
    fn test_defaults() {
        let config = SmtpConfig::default();
        assert_eq!(config.security, Security::Opportunistic);
        assert_eq!(config.client_hostname, "localhost");
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(SmtpConfig::builder().build(), config);
    }

    #[test]
    fn test_builder() {
        let config = SmtpConfig::builder()
            .security(Security::Tls)
            .client_hostname("mail.example.org")
            .connect_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.security, Security::Tls);
        assert_eq!(config.client_hostname, "mail.example.org");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }
}
