//! Pluggable body transfer encoders.

use crate::encoding::{encode_base64_wrapped, encode_quoted_printable};
use std::fmt;

/// Prepares body bytes for transfer over the wire.
///
/// An encoder turns raw body bytes into a 7-bit safe form and names the
/// scheme it used; the name goes into each part's
/// `Content-Transfer-Encoding` header. Implementations hold no mutable
/// state, so one encoder serves every part of a message.
pub trait TransferEncoder: fmt::Debug {
    /// Encodes raw body bytes.
    fn encode(&self, src: &[u8]) -> Vec<u8>;

    /// Returns the `Content-Transfer-Encoding` token, e.g. `quoted-printable`.
    fn label(&self) -> &str;
}

impl<T: TransferEncoder + ?Sized> TransferEncoder for &T {
    fn encode(&self, src: &[u8]) -> Vec<u8> {
        (**self).encode(src)
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

impl<T: TransferEncoder + ?Sized> TransferEncoder for Box<T> {
    fn encode(&self, src: &[u8]) -> Vec<u8> {
        (**self).encode(src)
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

/// Quoted-Printable encoder (RFC 2045 §6.7). The default for new messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotedPrintable;

impl TransferEncoder for QuotedPrintable {
    fn encode(&self, src: &[u8]) -> Vec<u8> {
        encode_quoted_printable(src)
    }

    fn label(&self) -> &str {
        "quoted-printable"
    }
}

/// Base64 encoder with 76-column CRLF line wrapping (RFC 2045 §6.8).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64;

impl TransferEncoder for Base64 {
    fn encode(&self, src: &[u8]) -> Vec<u8> {
        encode_base64_wrapped(src)
    }

    fn label(&self) -> &str {
        "base64"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(QuotedPrintable.label(), "quoted-printable");
        assert_eq!(Base64.label(), "base64");
    }

    #[test]
    fn test_quoted_printable_encoder() {
        assert_eq!(QuotedPrintable.encode(b"1+1=2"), b"1+1=3D2");
    }

    #[test]
    fn test_base64_encoder() {
        assert_eq!(Base64.encode(b"Hello"), b"SGVsbG8=");
    }

    #[test]
    fn test_boxed_encoder_delegates() {
        let encoder: Box<dyn TransferEncoder> = Box::new(Base64);
        assert_eq!(encoder.label(), "base64");
        assert_eq!(encoder.encode(b"Hello"), b"SGVsbG8=");
    }
}
