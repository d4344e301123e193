//! EHLO keywords.

/// Service extension advertised in the EHLO reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS (RFC 3207)
    StartTls,
    /// AUTH with the mechanisms the relay offers (RFC 4954)
    Auth(Vec<AuthMechanism>),
    /// SIZE with an optional byte limit (RFC 1870)
    Size(Option<usize>),
    /// 8BITMIME
    EightBitMime,
    /// PIPELINING
    Pipelining,
    /// Anything else, kept verbatim.
    Other(String),
}

impl Extension {
    /// Parses one EHLO line (without the `250-` prefix).
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Self::Other(line.to_string());
        };

        match keyword.to_ascii_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(words.filter_map(AuthMechanism::parse).collect()),
            // 0 means "no fixed limit"
            "SIZE" => Self::Size(
                words
                    .next()
                    .and_then(|s| s.parse().ok())
                    .filter(|&limit: &usize| limit > 0),
            ),
            "8BITMIME" => Self::EightBitMime,
            "PIPELINING" => Self::Pipelining,
            _ => Self::Other(line.to_string()),
        }
    }
}

/// SASL mechanism the transport knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN (RFC 4616)
    Plain,
    /// LOGIN
    Login,
}

impl AuthMechanism {
    /// Parses a mechanism name; unsupported mechanisms yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("PLAIN") {
            Some(Self::Plain)
        } else if s.eq_ignore_ascii_case("LOGIN") {
            Some(Self::Login)
        } else {
            None
        }
    }

    /// Returns the mechanism name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
        assert_eq!(Extension::parse("8BITMIME"), Extension::EightBitMime);
        assert_eq!(Extension::parse("PIPELINING"), Extension::Pipelining);
        assert_eq!(
            Extension::parse("ENHANCEDSTATUSCODES"),
            Extension::Other("ENHANCEDSTATUSCODES".into())
        );
    }

    #[test]
    fn test_parse_auth_keeps_known_mechanisms() {
        assert_eq!(
            Extension::parse("AUTH CRAM-MD5 login PLAIN XOAUTH2"),
            Extension::Auth(vec![AuthMechanism::Login, AuthMechanism::Plain])
        );
        assert_eq!(Extension::parse("AUTH"), Extension::Auth(Vec::new()));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(Extension::parse("SIZE 35882577"), Extension::Size(Some(35_882_577)));
        assert_eq!(Extension::parse("SIZE"), Extension::Size(None));
        assert_eq!(Extension::parse("SIZE 0"), Extension::Size(None));
        assert_eq!(Extension::parse("SIZE lots"), Extension::Size(None));
    }

    #[test]
    fn test_mechanism_names() {
        assert_eq!(AuthMechanism::Plain.as_str(), "PLAIN");
        assert_eq!(AuthMechanism::parse("login"), Some(AuthMechanism::Login));
        assert_eq!(AuthMechanism::parse("GSSAPI"), None);
    }
}
