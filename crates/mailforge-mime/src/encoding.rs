//! Body encoding and decoding primitives.
//!
//! Supports Quoted-Printable (RFC 2045 §6.7) and Base64 with MIME line
//! wrapping. The [`TransferEncoder`](crate::TransferEncoder) implementations
//! are thin wrappers over these functions.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Maximum encoded line length for Quoted-Printable and Base64 bodies.
pub const MAX_LINE_LENGTH: usize = 76;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64, broken into CRLF-separated lines of at most
/// [`MAX_LINE_LENGTH`] characters.
#[must_use]
pub fn encode_base64_wrapped(data: &[u8]) -> Vec<u8> {
    let encoded = STANDARD.encode(data);
    let mut result = Vec::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2);

    for (index, line) in encoded.as_bytes().chunks(MAX_LINE_LENGTH).enumerate() {
        if index > 0 {
            result.extend_from_slice(b"\r\n");
        }
        result.extend_from_slice(line);
    }

    result
}

/// Decodes Base64 data.
///
/// Whitespace (including line breaks) is ignored.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Encodes bytes using Quoted-Printable encoding (RFC 2045).
///
/// Printable ASCII other than `=` is copied. Spaces and tabs are copied
/// unless they end a line, where they are escaped. `\r\n` is the only hard
/// line break; a lone `\r` or `\n` is escaped like any other control byte, so
/// the output never contains a bare line feed. Everything else becomes `=XX`.
/// Lines longer than [`MAX_LINE_LENGTH`] are split with `=\r\n` soft breaks.
#[must_use]
pub fn encode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut line_length = 0;
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];

        if byte == b'\r' && data.get(i + 1) == Some(&b'\n') {
            result.extend_from_slice(b"\r\n");
            line_length = 0;
            i += 2;
            continue;
        }

        let at_line_end = match data.get(i + 1) {
            None => true,
            Some(b'\r') => data.get(i + 2) == Some(&b'\n'),
            Some(_) => false,
        };

        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            b' ' | b'\t' => !at_line_end,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // The last character of a line may use the column a soft break needs.
        let limit = if at_line_end {
            MAX_LINE_LENGTH
        } else {
            MAX_LINE_LENGTH - 1
        };
        if line_length + width > limit {
            result.extend_from_slice(b"=\r\n");
            line_length = 0;
        }

        if literal {
            result.push(byte);
        } else {
            result.push(b'=');
            result.push(HEX_DIGITS[usize::from(byte >> 4)]);
            result.push(HEX_DIGITS[usize::from(byte & 0x0F)]);
        }
        line_length += width;
        i += 1;
    }

    result
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'=' {
            result.push(data[i]);
            i += 1;
            continue;
        }

        let rest = &data[i + 1..];

        // Soft line break
        if rest.starts_with(b"\r\n") {
            i += 3;
            continue;
        }
        if rest.starts_with(b"\n") {
            i += 2;
            continue;
        }

        match rest {
            [high, low, ..] => {
                let byte = hex_value(*high)
                    .zip(hex_value(*low))
                    .map(|(high, low)| (high << 4) | low)
                    .ok_or_else(|| {
                        Error::InvalidEncoding(format!(
                            "Invalid hex: {}{}",
                            char::from(*high),
                            char::from(*low)
                        ))
                    })?;
                result.push(byte);
                i += 3;
            }
            _ => {
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        }
    }

    Ok(result)
}

const fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::needless_collect)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode_decode() {
        let data = b"Hello, World!";
        let encoded = encode_base64(data);
        assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");

        let decoded = decode_base64(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_base64_wrapped_lines() {
        let data = vec![b'x'; 120];
        let encoded = encode_base64_wrapped(&data);
        let text = String::from_utf8(encoded).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.len() <= MAX_LINE_LENGTH));
        assert_eq!(decode_base64(&text).unwrap(), data);
    }

    #[test]
    fn test_quoted_printable_plain_ascii_unchanged() {
        assert_eq!(encode_quoted_printable(b"Hello, World!"), b"Hello, World!");
        assert_eq!(
            encode_quoted_printable(b"line one\r\nline two"),
            b"line one\r\nline two"
        );
    }

    #[test]
    fn test_quoted_printable_bare_line_feed() {
        assert_eq!(encode_quoted_printable(b"a\nb"), b"a=0Ab");
        assert_eq!(encode_quoted_printable(b"end \nnext"), b"end =0Anext");
        assert_eq!(encode_quoted_printable(b"\n\r\n"), b"=0A\r\n");
        assert_eq!(decode_quoted_printable(b"a=0Ab").unwrap(), b"a\nb");
    }

    #[test]
    fn test_quoted_printable_escapes_equals() {
        assert_eq!(encode_quoted_printable(b"a=b"), b"a=3Db");
    }

    #[test]
    fn test_quoted_printable_encodes_utf8() {
        let encoded = encode_quoted_printable("Héllo, Wørld!".as_bytes());
        assert_eq!(encoded, b"H=C3=A9llo, W=C3=B8rld!");
    }

    #[test]
    fn test_quoted_printable_trailing_whitespace() {
        assert_eq!(encode_quoted_printable(b"end \r\nnext\t"), b"end=20\r\nnext=09");
    }

    #[test]
    fn test_quoted_printable_bare_carriage_return() {
        assert_eq!(encode_quoted_printable(b"a\rb"), b"a=0Db");
    }

    #[test]
    fn test_quoted_printable_soft_break() {
        let data = vec![b'a'; 100];
        let encoded = encode_quoted_printable(&data);
        let text = String::from_utf8(encoded.clone()).unwrap();
        let lines: Vec<&str> = text.split("\r\n").collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), MAX_LINE_LENGTH);
        assert!(lines[0].ends_with('='));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), data);
    }

    #[test]
    fn test_quoted_printable_full_width_line_is_not_broken() {
        let data = vec![b'a'; MAX_LINE_LENGTH];
        assert_eq!(encode_quoted_printable(&data), data);
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(decode_quoted_printable(b"Hello, World!").unwrap(), b"Hello, World!");
        assert_eq!(
            decode_quoted_printable(b"H=C3=A9llo").unwrap(),
            "Héllo".as_bytes()
        );
        assert_eq!(decode_quoted_printable(b"h=c3=a9").unwrap(), "hé".as_bytes());
    }

    #[test]
    fn test_quoted_printable_soft_line_break() {
        assert_eq!(decode_quoted_printable(b"Hello=\r\nWorld").unwrap(), b"HelloWorld");
        assert_eq!(decode_quoted_printable(b"Hello=\nWorld").unwrap(), b"HelloWorld");
    }

    #[test]
    fn test_quoted_printable_invalid_escapes() {
        assert!(decode_quoted_printable(b"abc=4").is_err());
        assert!(decode_quoted_printable(b"abc=ZZ").is_err());
    }

    proptest! {
        #[test]
        fn quoted_printable_lines_fit_and_decode(data in proptest::collection::vec(any::<u8>(), 0..400)) {
            let encoded = encode_quoted_printable(&data);
            for (index, &byte) in encoded.iter().enumerate() {
                if byte == b'\n' {
                    prop_assert!(index > 0 && encoded[index - 1] == b'\r');
                }
            }
            for line in encoded.split(|&b| b == b'\n') {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                prop_assert!(line.len() <= MAX_LINE_LENGTH);
            }
            prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), data);
        }
    }
}
