//! Bracket Notation Parsing and Serialization
//!
//! ```text
//! word    := letter ( gap? letter )*
//! letter  := '[' token+ ']'
//! token   := label ( '^' exponent )?
//! label   := DIGIT(1-9) | '(' NUMBER ')'
//! gap     := '{' FLOAT '}'
//! ```

use crate::letter::MAX_EXPONENT;
use crate::{ExtendedLetter, Word, WordError};
use std::iter::Peekable;
use std::str::Chars;

/// Parse a word written in bracket notation
pub fn parse_word(notation: &str) -> Result<Word, WordError> {
    Parser::new(notation).parse()
}

/// Parse a word and check it against a channel count
pub fn parse_word_for(notation: &str, channels: usize) -> Result<Word, WordError> {
    let word = parse_word(notation)?;
    word.validate(channels).map_err(|err| match err {
        WordError::MalformedWord { reason, .. } => WordError::malformed(notation, reason),
    })?;
    Ok(word)
}

/// Canonical notation for a word
pub fn serialize_word(word: &Word) -> String {
    let mut out = String::new();
    for (i, letter) in word.letters().iter().enumerate() {
        let alpha = word.gap_before(i);
        if alpha != 0.0 {
            out.push('{');
            out.push_str(&alpha.to_string());
            out.push('}');
        }
        out.push('[');
        for &(channel, exponent) in letter.factors() {
            let label = channel + 1;
            for _ in 0..exponent {
                if label <= 9 {
                    out.push_str(&label.to_string());
                } else {
                    out.push('(');
                    out.push_str(&label.to_string());
                    out.push(')');
                }
            }
        }
        out.push(']');
    }
    out
}

struct Parser<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> WordError {
        WordError::malformed(self.source, reason)
    }

    fn parse(mut self) -> Result<Word, WordError> {
        if self.source.is_empty() {
            return Err(self.error("empty notation"));
        }

        let mut word = Word::new();
        let mut alpha = 0.0;
        loop {
            match self.chars.next() {
                Some('[') => {
                    let letter = self.letter()?;
                    word.push_with_gap(alpha, letter);
                    alpha = 0.0;
                }
                Some('{') if !word.is_empty() => {
                    alpha = self.gap()?;
                    if self.chars.peek() != Some(&'[') {
                        return Err(self.error("gap weight must be followed by a letter"));
                    }
                }
                Some('{') => return Err(self.error("gap weight before the first letter")),
                Some(c) => return Err(self.error(format!("unexpected character '{}'", c))),
                None => break,
            }
        }
        Ok(word)
    }

    fn letter(&mut self) -> Result<ExtendedLetter, WordError> {
        let mut letter = ExtendedLetter::new();
        loop {
            match self.chars.next() {
                Some(']') if letter.is_empty() => {
                    return Err(self.error("empty extended letter"))
                }
                Some(']') => return Ok(letter),
                Some('0') => return Err(self.error("channel labels start at 1")),
                Some(c @ '1'..='9') => {
                    let label = c as usize - '0' as usize;
                    let exponent = self.exponent()?;
                    self.multiply(&mut letter, label - 1, exponent)?;
                }
                Some('(') => {
                    let label = self.number(')')?;
                    if label == 0 {
                        return Err(self.error("channel labels start at 1"));
                    }
                    let exponent = self.exponent()?;
                    self.multiply(&mut letter, label - 1, exponent)?;
                }
                Some(c) => {
                    return Err(self.error(format!("unexpected character '{}' in letter", c)))
                }
                None => return Err(self.error("unterminated extended letter")),
            }
        }
    }

    fn multiply(
        &self,
        letter: &mut ExtendedLetter,
        channel: usize,
        exponent: u32,
    ) -> Result<(), WordError> {
        letter.checked_push(channel, exponent).ok_or_else(|| {
            self.error(format!(
                "exponent of channel {} exceeds {}",
                channel + 1,
                MAX_EXPONENT
            ))
        })
    }

    fn exponent(&mut self) -> Result<u32, WordError> {
        if self.chars.peek() != Some(&'^') {
            return Ok(1);
        }
        self.chars.next();
        let mut digits = String::new();
        while let Some(c) = self.chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            self.chars.next();
        }
        match digits.parse::<u32>() {
            Ok(0) => Err(self.error("exponent must be at least 1")),
            Ok(e) if e > MAX_EXPONENT => {
                Err(self.error(format!("exponent {} exceeds {}", e, MAX_EXPONENT)))
            }
            Ok(e) => Ok(e),
            Err(_) if digits.is_empty() => Err(self.error("missing exponent after '^'")),
            Err(_) => Err(self.error(format!("exponent {} is too large", digits))),
        }
    }

    fn number(&mut self, terminator: char) -> Result<usize, WordError> {
        let mut digits = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == terminator => break,
                Some(c) if c.is_ascii_digit() => digits.push(c),
                Some(c) => return Err(self.error(format!("unexpected character '{}' in label", c))),
                None => return Err(self.error("unterminated channel label")),
            }
        }
        digits
            .parse::<usize>()
            .map_err(|_| self.error(format!("invalid channel label '{}'", digits)))
    }

    fn gap(&mut self) -> Result<f64, WordError> {
        let mut raw = String::new();
        loop {
            match self.chars.next() {
                Some('}') => break,
                Some(c) => raw.push(c),
                None => return Err(self.error("unterminated gap weight")),
            }
        }
        match raw.parse::<f64>() {
            Ok(a) if a.is_finite() && a >= 0.0 => Ok(a),
            _ => Err(self.error(format!("invalid gap weight '{}'", raw))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple_word() {
        let word = parse_word("[11][122]").unwrap();
        assert_eq!(word.len(), 2);
        assert_eq!(word.letters()[0].factors(), &[(0, 2)]);
        assert_eq!(word.letters()[1].factors(), &[(0, 1), (1, 2)]);
    }

    #[test]
    fn test_letter_order_is_irrelevant() {
        assert_eq!(parse_word("[12][122]").unwrap(), parse_word("[21][212]").unwrap());
    }

    #[test]
    fn test_parse_exponents_and_long_labels() {
        let word = parse_word("[(12)^3 1^2]").err();
        assert!(word.is_some(), "whitespace is not part of the grammar");

        let word = parse_word("[(12)^3(1)^2]").unwrap();
        assert_eq!(word.letters()[0].factors(), &[(0, 2), (11, 3)]);
        assert_eq!(serialize_word(&word), "[11(12)(12)(12)]");
    }

    #[test]
    fn test_parse_gap_weights() {
        let word = parse_word("[1]{0.25}[2][3]").unwrap();
        assert_eq!(word.alphas(), &[0.25, 0.0]);
        assert_eq!(serialize_word(&word), "[1]{0.25}[2][3]");
    }

    #[test]
    fn test_malformed_notation() {
        for bad in [
            "", "[]", "[1", "1]", "[0]", "[a]", "[1]{0.5}", "{0.5}[1]", "[1]{-1}[2]",
            "[1^0]", "[1^]", "[()]", "[1] [2]",
        ] {
            assert!(
                matches!(parse_word(bad), Err(WordError::MalformedWord { .. })),
                "'{}' should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_oversized_exponents_are_rejected() {
        for bad in [
            "[1^4294967295(1)]",
            "[1^2147483647(1)]",
            "[1^2147483648]",
            "[(2)^99999999999]",
            "[1^2147483647(1)^2147483647]",
        ] {
            assert!(
                matches!(parse_word(bad), Err(WordError::MalformedWord { .. })),
                "'{}' should be rejected",
                bad
            );
        }

        let word = parse_word("[1^2147483646(1)]").unwrap();
        assert_eq!(word.letters()[0].factors(), &[(0, MAX_EXPONENT)]);
    }

    #[test]
    fn test_parse_for_channel_count() {
        assert!(parse_word_for("[12][2]", 2).is_ok());
        let err = parse_word_for("[13]", 2).unwrap_err();
        assert!(err.to_string().contains("channel label 3"));
    }

    fn arb_word() -> impl Strategy<Value = Word> {
        let letter = prop::collection::vec((0usize..14, 1u32..4), 1..4)
            .prop_map(ExtendedLetter::from_pairs);
        let gap = prop_oneof![Just(0.0), (1u32..1000).prop_map(|v| v as f64 / 64.0)];
        prop::collection::vec((gap, letter), 1..5).prop_map(|parts| {
            let mut word = Word::new();
            for (alpha, letter) in parts {
                word.push_with_gap(alpha, letter);
            }
            word
        })
    }

    proptest! {
        #[test]
        fn prop_notation_round_trip(word in arb_word()) {
            let text = serialize_word(&word);
            prop_assert_eq!(parse_word(&text).unwrap(), word);
        }
    }
}
