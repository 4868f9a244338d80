//! `.bit` program image parser and writer.
//!
//! A program image is plain text with one instruction word per line, written
//! as binary digits, most significant bit first:
//!
//! ```text
//! // GETX R0
//! 01_00_00_00  // comments may follow a word
//!
//! 0100_0000
//! ```
//!
//! `_` separators are ignored, `//` starts a comment, and blank lines are
//! skipped. The parser does not check the word count; the program store
//! rejects images of the wrong length.

use std::fmt::Write as _;

/// Widest word the format carries.
pub const WORD_BITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitError {
    #[error("line {line}: invalid binary digit {ch:?}")]
    InvalidDigit { line: usize, ch: char },
    #[error("line {line}: word has {bits} bits (max {WORD_BITS})")]
    WordTooWide { line: usize, bits: usize },
}

/// Parse a program image. Line numbers in errors are 1-based.
pub fn parse(text: &str) -> Result<Vec<u8>, BitError> {
    let mut words = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let code = raw.split("//").next().unwrap_or("");
        let digits: String = code.chars().filter(|&c| c != '_' && !c.is_whitespace()).collect();
        if digits.is_empty() {
            continue;
        }
        if let Some(ch) = digits.chars().find(|&c| c != '0' && c != '1') {
            return Err(BitError::InvalidDigit { line, ch });
        }
        let bits = digits.chars().count();
        if bits > WORD_BITS {
            return Err(BitError::WordTooWide { line, bits });
        }
        let word = digits
            .chars()
            .fold(0u8, |word, ch| (word << 1) | u8::from(ch == '1'));
        words.push(word);
    }
    Ok(words)
}

/// Render a program image, one 8-digit word per line.
#[must_use]
pub fn write(words: &[u8]) -> String {
    let mut out = String::with_capacity(words.len() * 9);
    for word in words {
        let _ = writeln!(out, "{word:08b}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words_with_separators_and_comments() {
        let text = "// header\n01_00_00_00 // NOP\n\n0000_0001\n  11111111  \n";
        assert_eq!(parse(text), Ok(vec![0x40, 0x01, 0xFF]));
    }

    #[test]
    fn short_words_are_right_aligned() {
        assert_eq!(parse("101\n"), Ok(vec![0b101]));
    }

    #[test]
    fn rejects_non_binary_digit() {
        assert_eq!(
            parse("0100_0000\n0102_0000\n"),
            Err(BitError::InvalidDigit { line: 2, ch: '2' })
        );
    }

    #[test]
    fn rejects_wide_word() {
        assert_eq!(
            parse("1_0000_0000\n"),
            Err(BitError::WordTooWide { line: 1, bits: 9 })
        );
    }

    #[test]
    fn bad_digit_is_reported_before_width() {
        assert_eq!(
            parse("12345678x\n"),
            Err(BitError::InvalidDigit { line: 1, ch: '2' })
        );
        assert_eq!(
            parse("0100000\u{e9}\n"),
            Err(BitError::InvalidDigit { line: 1, ch: '\u{e9}' })
        );
    }

    #[test]
    fn comment_only_file_is_empty() {
        assert_eq!(parse("// nothing here\n\n"), Ok(Vec::new()));
    }

    #[test]
    fn written_image_parses_back() {
        let words = [0x40, 0x00, 0xA5, 0xFF];
        let text = write(&words);
        assert!(text.starts_with("01000000\n"));
        assert_eq!(parse(&text), Ok(words.to_vec()));
    }

    #[test]
    fn error_messages_name_the_line() {
        let err = parse("x\n").expect_err("invalid digit");
        assert_eq!(err.to_string(), "line 1: invalid binary digit 'x'");
    }
}
