//! Header folding (RFC 5322 §2.2.3).

/// Column limit used for every header written by [`Message`](crate::Message).
pub const MAX_LINE_WIDTH: usize = 78;

/// Folds a header line so that no physical line is wider than `max_width`.
///
/// The line starts with `prefix` (e.g. `"Subject: "`), followed by the words
/// of `value` separated by single spaces. When the next word does not fit,
/// the line is ended with `\r\n ` and the word starts a continuation line.
/// A word wider than `max_width` is never split: after the first word it
/// starts a continuation line of its own, while a first word stays on the
/// prefix line. The result always ends with `\r\n`.
///
/// Runs of spaces in `value` collapse to one. `\r` and `\n` in `value` count
/// as spaces, so a value cannot end the header early. Widths are counted in bytes,
/// and the leading space of a continuation line counts toward its width.
///
/// ```
/// use mailforge_mime::fold;
///
/// assert_eq!(fold::fold(78, "Subject: ", "Hi there"), "Subject: Hi there\r\n");
/// assert_eq!(fold::fold(12, "To: ", "a@x.com b@x.com"), "To: a@x.com\r\n b@x.com\r\n");
/// ```
#[must_use]
pub fn fold(max_width: usize, prefix: &str, value: &str) -> String {
    let mut folded = String::with_capacity(prefix.len() + value.len() + 2);
    folded.push_str(prefix);

    let mut line_length = prefix.len();
    let mut line_has_word = false;

    for word in value
        .split([' ', '\r', '\n'])
        .filter(|word| !word.is_empty())
    {
        if !line_has_word {
            folded.push_str(word);
            line_length += word.len();
            line_has_word = true;
        } else if line_length + 1 + word.len() <= max_width {
            folded.push(' ');
            folded.push_str(word);
            line_length += 1 + word.len();
        } else {
            folded.push_str("\r\n ");
            folded.push_str(word);
            line_length = 1 + word.len();
        }
    }

    folded.push_str("\r\n");
    folded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Undoes folding: drops the prefix, joins continuation lines.
    fn unfold(folded: &str, prefix: &str) -> String {
        folded
            .strip_prefix(prefix)
            .unwrap()
            .strip_suffix("\r\n")
            .unwrap()
            .replace("\r\n ", " ")
    }

    #[test]
    fn test_short_value_single_line() {
        assert_eq!(fold(78, "To: ", "a@x.com"), "To: a@x.com\r\n");
    }

    #[test]
    fn test_no_trailing_space() {
        let folded = fold(78, "Subject: ", "one two three");
        assert_eq!(folded, "Subject: one two three\r\n");
    }

    #[test]
    fn test_breaks_at_width() {
        let folded = fold(20, "Subject: ", "alpha beta gamma delta");
        assert_eq!(folded, "Subject: alpha beta\r\n gamma delta\r\n");
        for line in folded.split("\r\n") {
            assert!(line.len() <= 20);
        }
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        // "Subject: " is 9 bytes, "abcd efghij" makes exactly 20
        assert_eq!(fold(20, "Subject: ", "abcd efghij"), "Subject: abcd efghij\r\n");
        assert_eq!(fold(20, "Subject: ", "abcd efghijk"), "Subject: abcd\r\n efghijk\r\n");
    }

    #[test]
    fn test_long_word_kept_whole() {
        let word = "x".repeat(100);
        let folded = fold(78, "Subject: ", &format!("short {word} tail"));
        assert_eq!(folded, format!("Subject: short\r\n {word}\r\n tail\r\n"));
    }

    #[test]
    fn test_long_first_word_stays_after_prefix() {
        let word = "y".repeat(90);
        assert_eq!(fold(78, "To: ", &word), format!("To: {word}\r\n"));
    }

    #[test]
    fn test_empty_value_yields_prefix_line() {
        assert_eq!(fold(78, "Cc: ", ""), "Cc: \r\n");
    }

    #[test]
    fn test_collapses_repeated_spaces() {
        assert_eq!(fold(78, "Subject: ", "a  b   c"), "Subject: a b c\r\n");
    }

    #[test]
    fn test_line_breaks_in_value_become_spaces() {
        assert_eq!(
            fold(78, "Subject: ", "Hi\r\nBcc: victim@x.com\nend"),
            "Subject: Hi Bcc: victim@x.com end\r\n"
        );
    }

    proptest! {
        #[test]
        fn unfold_restores_normalized_value(
            words in proptest::collection::vec("[a-zA-Z0-9@.<>,]{1,30}", 1..40),
            width in 20usize..120,
        ) {
            let value = words.join(" ");
            let folded = fold(width, "Subject: ", &value);
            prop_assert_eq!(unfold(&folded, "Subject: "), value);
        }

        #[test]
        fn lines_respect_width_unless_single_word(
            words in proptest::collection::vec("[a-z]{1,100}", 1..30),
        ) {
            let value = words.join(" ");
            let folded = fold(MAX_LINE_WIDTH, "To: ", &value);
            let body = folded.strip_suffix("\r\n").unwrap();

            for (index, line) in body.split("\r\n").enumerate() {
                let content = if index == 0 {
                    line.strip_prefix("To: ").unwrap()
                } else {
                    line.strip_prefix(' ').unwrap()
                };
                prop_assert!(line.len() <= MAX_LINE_WIDTH || !content.contains(' '));
            }
        }
    }
}
