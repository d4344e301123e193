//! Server replies.

use std::fmt;

/// A complete (possibly multi-line) reply from the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Three-digit reply code.
    pub code: ReplyCode,
    /// Text of each reply line, without code and separator.
    pub lines: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Returns true for 2xx replies.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the reply text with lines joined by a space.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Converts the reply into an [`Error::SmtpError`](crate::Error::SmtpError).
    #[must_use]
    pub fn into_error(self) -> crate::Error {
        crate::Error::smtp_error(self.code.as_u16(), self.text())
    }
}

/// Three-digit SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCESS: Self = Self(235);
    /// 250 Requested action completed
    pub const OK: Self = Self(250);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);

    /// Creates a reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// 2xx
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// 3xx
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_classes() {
        assert!(ReplyCode::OK.is_success());
        assert!(ReplyCode::AUTH_SUCCESS.is_success());
        assert!(ReplyCode::START_DATA.is_intermediate());
        assert!(ReplyCode::AUTH_CONTINUE.is_intermediate());
        assert!(!ReplyCode::new(552).is_success());
        assert!(!ReplyCode::new(421).is_intermediate());
    }

    #[test]
    fn test_reply_text() {
        let reply = Reply::new(
            ReplyCode::new(550),
            vec!["5.1.1 No such user".into(), "see docs".into()],
        );
        assert!(!reply.is_success());
        assert_eq!(reply.text(), "5.1.1 No such user see docs");
    }

    #[test]
    fn test_into_error() {
        let reply = Reply::new(ReplyCode::new(451), vec!["Try again later".into()]);
        let err = reply.into_error();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "SMTP error 451: Try again later");
    }
}
