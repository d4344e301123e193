//! Reading formatted messages back into headers and parts.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::error::{Error, Result};
use crate::header::Headers;
use std::fmt;

/// Transfer encoding named by a `Content-Transfer-Encoding` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit data.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses a transfer encoding token. Unknown tokens read as 7bit.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit,
        }
    }

    /// Decodes a body written with this encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid for the encoding.
    pub fn decode(self, body: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Base64 => decode_base64(&String::from_utf8_lossy(body)),
            Self::QuotedPrintable => decode_quoted_printable(body),
            Self::SevenBit | Self::EightBit | Self::Binary => Ok(body.to_vec()),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Base64 => "base64",
            Self::QuotedPrintable => "quoted-printable",
            Self::Binary => "binary",
        })
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body as transmitted (still transfer-encoded).
    pub body: Vec<u8>,
}

impl Part {
    /// Creates a new part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self { headers, body }
    }

    /// Gets the content type, `text/plain; charset=utf-8` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        self.transfer_encoding().decode(&self.body)
    }

    /// Gets the decoded body as a string.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding or UTF-8 conversion fails.
    pub fn body_text(&self) -> Result<String> {
        String::from_utf8(self.decode_body()?).map_err(Into::into)
    }

    fn parse(text: &str) -> Self {
        let (header_block, body) = split_header_block(text);
        Self::new(Headers::parse(header_block), body.as_bytes().to_vec())
    }
}

/// A message read from its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Message headers.
    pub headers: Headers,
    /// Parts of a multipart body, in order (empty for single-part messages).
    pub parts: Vec<Part>,
    /// Body of a single-part message.
    pub body: Option<Vec<u8>>,
}

impl ParsedMessage {
    /// Parses a message.
    ///
    /// Multipart bodies are split on their boundary delimiter lines up to
    /// the close delimiter; a missing close delimiter ends the last part at
    /// the end of input. Each part body loses the CRLF that precedes the next
    /// delimiter plus the one CRLF [`Message`](crate::Message) writes after
    /// every encoded body.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is invalid or a multipart
    /// message has no boundary.
    pub fn parse(text: &str) -> Result<Self> {
        let (header_block, body) = split_header_block(text);
        let headers = Headers::parse(header_block);

        let content_type = headers
            .get("content-type")
            .map(ContentType::parse)
            .transpose()?;

        match content_type {
            Some(ct) if ct.is_multipart() => {
                let boundary = ct.boundary().ok_or(Error::MissingBoundary)?;
                let parts = split_parts(body, boundary)?;
                Ok(Self {
                    headers,
                    parts,
                    body: None,
                })
            }
            _ => Ok(Self {
                headers,
                parts: Vec::new(),
                body: Some(body.as_bytes().to_vec()),
            }),
        }
    }

    /// Gets the content type, `text/plain; charset=utf-8` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Mailboxes listed in the To header.
    #[must_use]
    pub fn to(&self) -> Vec<&str> {
        self.mailboxes("to")
    }

    /// Mailboxes listed in the Cc header.
    #[must_use]
    pub fn cc(&self) -> Vec<&str> {
        self.mailboxes("cc")
    }

    /// Mailboxes listed in the Bcc header.
    #[must_use]
    pub fn bcc(&self) -> Vec<&str> {
        self.mailboxes("bcc")
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.headers.get("date")
    }

    /// Finds the first text/plain part.
    ///
    /// # Errors
    ///
    /// Returns an error if no text part is found or decoding fails.
    pub fn text_part(&self) -> Result<String> {
        self.find_part("text", "plain")
    }

    /// Finds the first text/html part.
    ///
    /// # Errors
    ///
    /// Returns an error if no HTML part is found or decoding fails.
    pub fn html_part(&self) -> Result<String> {
        self.find_part("text", "html")
    }

    fn find_part(&self, main_type: &str, sub_type: &str) -> Result<String> {
        for part in &self.parts {
            if part.content_type()?.is(main_type, sub_type) {
                return part.body_text();
            }
        }

        Err(Error::Parse(format!("No {main_type}/{sub_type} part found")))
    }

    fn mailboxes(&self, name: &str) -> Vec<&str> {
        self.headers
            .get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|mailbox| !mailbox.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Splits at the first empty line. Without one, everything is header.
fn split_header_block(text: &str) -> (&str, &str) {
    if let Some(index) = text.find("\r\n\r\n") {
        (&text[..index], &text[index + 4..])
    } else if let Some(index) = text.find("\n\n") {
        (&text[..index], &text[index + 2..])
    } else {
        (text, "")
    }
}

fn split_parts(body: &str, boundary: &str) -> Result<Vec<Part>> {
    let delimiter = format!("\r\n--{boundary}");
    // The first delimiter may open the body without a preceding CRLF.
    let body = format!("\r\n{body}");

    let mut segments = body.split(delimiter.as_str());
    segments.next(); // preamble

    let mut parts = Vec::new();
    for segment in segments {
        if segment.starts_with("--") {
            return Ok(parts);
        }

        // Anything after the delimiter on its line is transport padding.
        let Some((_, content)) = segment.split_once("\r\n") else {
            return Err(Error::InvalidMultipart(format!(
                "Delimiter line without content: --{boundary}{segment}"
            )));
        };
        let content = content.strip_suffix("\r\n").unwrap_or(content);
        parts.push(Part::parse(content));
    }

    if parts.is_empty() {
        return Err(Error::InvalidMultipart(format!(
            "No parts delimited by --{boundary}"
        )));
    }

    Ok(parts)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MULTIPART: &str = concat!(
        "To: a@x.com, c@x.com\r\n",
        "From: b@x.com\r\n",
        "Subject: Greetings\r\n",
        "Content-Type: multipart/alternative;\r\n",
        " boundary=\"=_abc\"\r\n",
        "MIME-Version: 1.0\r\n",
        "\r\n--=_abc\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "H=C3=A9llo\r\n",
        "\r\n--=_abc\r\n",
        "Content-Type: text/html; charset=utf-8\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "PGI+SGk8L2I+\r\n",
        "\r\n--=_abc--\r\n",
    );

    #[test]
    fn test_transfer_encoding_parse() {
        assert_eq!(TransferEncoding::parse("7bit"), TransferEncoding::SevenBit);
        assert_eq!(TransferEncoding::parse("BASE64"), TransferEncoding::Base64);
        assert_eq!(
            TransferEncoding::parse(" quoted-printable "),
            TransferEncoding::QuotedPrintable
        );
        assert_eq!(TransferEncoding::QuotedPrintable.to_string(), "quoted-printable");
    }

    #[test]
    fn test_parse_multipart() {
        let message = ParsedMessage::parse(MULTIPART).unwrap();

        assert_eq!(message.to(), vec!["a@x.com", "c@x.com"]);
        assert!(message.cc().is_empty());
        assert_eq!(message.from(), Some("b@x.com"));
        assert_eq!(message.subject(), Some("Greetings"));
        assert!(message.content_type().unwrap().is_multipart());
        assert_eq!(message.parts.len(), 2);
        assert_eq!(message.text_part().unwrap(), "Héllo");
        assert_eq!(message.html_part().unwrap(), "<b>Hi</b>");
    }

    #[test]
    fn test_parse_without_close_delimiter() {
        let text = MULTIPART.strip_suffix("\r\n--=_abc--\r\n").unwrap();
        let message = ParsedMessage::parse(text).unwrap();
        assert_eq!(message.parts.len(), 2);
        assert_eq!(message.html_part().unwrap(), "<b>Hi</b>");
    }

    #[test]
    fn test_parse_single_part() {
        let text = "From: b@x.com\r\nSubject: Plain\r\n\r\nHello, World!";
        let message = ParsedMessage::parse(text).unwrap();

        assert!(message.parts.is_empty());
        assert_eq!(message.body.as_deref(), Some(&b"Hello, World!"[..]));
        assert!(message.text_part().is_err());
    }

    #[test]
    fn test_missing_boundary() {
        let text = "Content-Type: multipart/alternative\r\n\r\nbody";
        assert!(matches!(
            ParsedMessage::parse(text),
            Err(Error::MissingBoundary)
        ));
    }

    #[test]
    fn test_no_parts() {
        let text = "Content-Type: multipart/alternative; boundary=x\r\n\r\nno delimiters";
        assert!(matches!(
            ParsedMessage::parse(text),
            Err(Error::InvalidMultipart(_))
        ));
    }

    #[test]
    fn test_part_defaults() {
        let part = Part::new(Headers::new(), b"plain".to_vec());
        assert!(part.content_type().unwrap().is("text", "plain"));
        assert_eq!(part.transfer_encoding(), TransferEncoding::SevenBit);
        assert_eq!(part.body_text().unwrap(), "plain");
    }
}
