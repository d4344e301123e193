//! Byte stream to the relay, plain or TLS.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

/// Relay connection (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<TlsStream<TcpStream>>>),
}

impl SmtpStream {
    /// Reads one line, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the relay closed the connection.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = match self {
            Self::Tcp(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
        };
        if read == 0 {
            return Err(Error::Protocol("Connection closed by server".into()));
        }
        line.truncate(line.trim_end_matches(['\r', '\n']).len());
        Ok(line)
    }

    /// Writes and flushes `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Returns true once the connection is encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Performs the TLS handshake on a plain connection (after STARTTLS).
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the handshake fails.
    pub async fn upgrade_to_tls(self, hostname: &str) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(reader) => reader.into_inner(),
            Self::Tls(_) => return Err(Error::Protocol("Already using TLS".into())),
        };
        handshake(hostname, tcp_stream).await
    }
}

/// Opens a plain TCP connection.
///
/// # Errors
///
/// Returns an error if the connection fails or does not complete within `timeout`.
pub async fn connect(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open(hostname, port, timeout).await?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Opens an implicit-TLS connection (usually port 465).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16, timeout: Duration) -> Result<SmtpStream> {
    let stream = open(hostname, port, timeout).await?;
    handshake(hostname, stream).await
}

async fn open(hostname: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    tracing::debug!(hostname, port, "Connecting to SMTP relay");
    tokio::time::timeout(timeout, TcpStream::connect((hostname, port)))
        .await
        .map_err(|_| Error::Timeout(timeout))?
        .map_err(Error::from)
}

async fn handshake(hostname: &str, stream: TcpStream) -> Result<SmtpStream> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::InvalidServerAddress(hostname.to_string()))?;
    let tls_stream = tls_connector().connect(server_name, stream).await?;
    tracing::debug!(hostname, "TLS established");
    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls_stream))))
}

fn tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}
