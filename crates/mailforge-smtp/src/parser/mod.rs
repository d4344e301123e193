//! Reply line parsing.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Builds a [`Reply`] from the raw lines of one server response.
///
/// Lines must not carry their trailing CRLF. All lines of a multi-line reply
/// must share the code of the first line.
///
/// # Errors
///
/// Returns a protocol error for an empty reply, a missing or non-numeric code,
/// or lines whose code differs.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("Empty reply".into()))?;
    let code = reply_code(first)?;

    let mut text = Vec::with_capacity(lines.len());
    for line in lines {
        if reply_code(line)? != code {
            return Err(Error::Protocol(format!(
                "Mixed reply codes: expected {code}, got {line}"
            )));
        }
        text.push(line.get(4..).unwrap_or_default().to_string());
    }

    Ok(Reply::new(code, text))
}

/// Returns true when `line` ends a reply (`250 text` or a bare `250`).
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    match line.as_bytes().get(3) {
        None => line.len() == 3,
        Some(&separator) => separator == b' ',
    }
}

fn reply_code(line: &str) -> Result<ReplyCode> {
    let digits = line
        .get(..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::Protocol(format!("Malformed reply line: {line}")))?;
    match line.as_bytes().get(3) {
        None | Some(b' ' | b'-') => {}
        Some(_) => return Err(Error::Protocol(format!("Malformed reply line: {line}"))),
    }
    digits
        .parse()
        .map(ReplyCode::new)
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {digits}")))
}
