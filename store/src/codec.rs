//! Flat string→integer JSON codec for the counter file.
//!
//! The on-disk document is a single JSON object mapping counter names to
//! integers, with no nesting, no arrays and no floating-point values, for
//! example `{"HighTierUsageCount":132,"LowTierUsageCount":57}`. The codec is
//! written by hand instead of delegating to a general serializer so the file
//! contract stays explicit: keys are escaped per JSON string rules (quotes,
//! backslashes, the short control escapes, `\uXXXX` for the rest of the
//! control range) and values must be plain integers. Encoding iterates a
//! [`BTreeMap`], so output order is deterministic.

use std::collections::BTreeMap;

use thiserror::Error;

/// Failure raised while decoding a counter document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The document does not start with `{`.
    #[error("counter document must start with '{{'")]
    MissingOpeningBrace,
    /// The document ended before its closing `}`.
    #[error("counter document ended before its closing '}}'")]
    MissingClosingBrace,
    /// A counter name was still open when the document ended.
    #[error("unterminated counter name")]
    UnterminatedKey,
    /// A counter name contained an unknown escape sequence.
    #[error("invalid escape sequence '\\{found}' in counter name")]
    InvalidEscape {
        /// Character following the backslash.
        found: char,
    },
    /// A `\uXXXX` escape was malformed or named an unrepresentable character.
    #[error("invalid unicode escape in counter name")]
    InvalidUnicodeEscape,
    /// A counter name was not followed by `:`.
    #[error("expected ':' after counter name {key:?}")]
    MissingSeparator {
        /// Name of the counter missing its separator.
        key: String,
    },
    /// A counter value was missing, non-numeric, or out of range.
    #[error("invalid integer value for counter {key:?}")]
    InvalidValue {
        /// Name of the counter with the bad value.
        key: String,
    },
    /// The document contained a character that does not belong there.
    #[error("unexpected character '{found}' in counter document")]
    UnexpectedCharacter {
        /// Offending character.
        found: char,
    },
}

/// Encodes counters as the flat JSON object layout, sorted by key.
#[must_use]
pub fn encode(counters: &BTreeMap<String, i64>) -> String {
    let mut out = String::with_capacity(2 + counters.len() * 24);
    out.push('{');
    for (index, (key, value)) in counters.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push('"');
        escape_into(key, &mut out);
        out.push('"');
        out.push(':');
        out.push_str(&value.to_string());
    }
    out.push('}');
    out
}

/// Decodes a flat JSON counter object.
///
/// Duplicate keys resolve to the last occurrence. Whitespace between tokens
/// is tolerated; anything after the closing brace other than whitespace is
/// rejected.
pub fn decode(text: &str) -> Result<BTreeMap<String, i64>, CodecError> {
    let mut parser = Parser::new(text);
    let mut counters = BTreeMap::new();

    parser.skip_whitespace();
    if !parser.consume('{') {
        return Err(CodecError::MissingOpeningBrace);
    }

    parser.skip_whitespace();
    if !parser.consume('}') {
        loop {
            parser.skip_whitespace();
            let key = parser.parse_key()?;
            parser.skip_whitespace();
            if !parser.consume(':') {
                return Err(CodecError::MissingSeparator { key });
            }
            parser.skip_whitespace();
            let value = parser.parse_integer(&key)?;
            let _ = counters.insert(key, value);

            parser.skip_whitespace();
            if parser.consume(',') {
                continue;
            }
            if parser.consume('}') {
                break;
            }
            return Err(parser.unexpected());
        }
    }

    parser.skip_whitespace();
    if parser.at_end() {
        Ok(counters)
    } else {
        Err(parser.unexpected())
    }
}

fn escape_into(key: &str, out: &mut String) {
    for c in key.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn unexpected(&self) -> CodecError {
        match self.peek() {
            Some(found) => CodecError::UnexpectedCharacter { found },
            None => CodecError::MissingClosingBrace,
        }
    }

    fn parse_key(&mut self) -> Result<String, CodecError> {
        if !self.consume('"') {
            return Err(self.unexpected());
        }

        let mut key = String::new();
        loop {
            match self.bump() {
                None => return Err(CodecError::UnterminatedKey),
                Some('"') => return Ok(key),
                Some('\\') => key.push(self.parse_escape()?),
                Some(c) => key.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, CodecError> {
        match self.bump() {
            None => Err(CodecError::UnterminatedKey),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('/') => Ok('/'),
            Some('b') => Ok('\u{0008}'),
            Some('f') => Ok('\u{000C}'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('u') => self.parse_unicode_escape(),
            Some(found) => Err(CodecError::InvalidEscape { found }),
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char, CodecError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self.bump().ok_or(CodecError::InvalidUnicodeEscape)?;
            let nibble = digit.to_digit(16).ok_or(CodecError::InvalidUnicodeEscape)?;
            code = code * 16 + nibble;
        }
        char::from_u32(code).ok_or(CodecError::InvalidUnicodeEscape)
    }

    fn parse_integer(&mut self, key: &str) -> Result<i64, CodecError> {
        let mut digits = String::new();
        if self.consume('-') {
            digits.push('-');
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            digits.push(self.bump().unwrap_or('0'));
        }
        digits.parse().map_err(|_| CodecError::InvalidValue {
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, CodecError};
    use std::collections::BTreeMap;

    fn map(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn encodes_the_documented_layout_exactly() {
        let counters = map(&[("HighTierUsageCount", 132), ("LowTierUsageCount", 57)]);

        assert_eq!(
            encode(&counters),
            r#"{"HighTierUsageCount":132,"LowTierUsageCount":57}"#
        );
    }

    #[test]
    fn encodes_an_empty_document() {
        assert_eq!(encode(&BTreeMap::new()), "{}");
        assert_eq!(decode("{}").expect("decode"), BTreeMap::new());
    }

    #[test]
    fn round_trips_hostile_keys() {
        let counters = map(&[
            ("plain", 1),
            ("with \"quotes\"", 2),
            ("back\\slash", 3),
            ("tab\there", 4),
            ("new\nline", 5),
            ("bell\u{0007}char", 6),
            ("负数计数", -7),
        ]);

        let decoded = decode(&encode(&counters)).expect("decode");
        assert_eq!(decoded, counters);
    }

    #[test]
    fn escapes_control_characters_numerically() {
        let counters = map(&[("bell\u{0007}", 1)]);
        assert_eq!(encode(&counters), r#"{"bell\u0007":1}"#);
    }

    #[test]
    fn decodes_whitespace_and_unicode_escapes() {
        let decoded = decode(" { \"a\\u0041b\" : 9 , \"c\" : -12 } ").expect("decode");
        assert_eq!(decoded, map(&[("aAb", 9), ("c", -12)]));
    }

    #[test]
    fn duplicate_keys_resolve_to_the_last_occurrence() {
        let decoded = decode(r#"{"k":1,"k":2}"#).expect("decode");
        assert_eq!(decoded, map(&[("k", 2)]));
    }

    #[test]
    fn rejects_documents_that_are_not_flat_integer_objects() {
        assert_eq!(decode(""), Err(CodecError::MissingOpeningBrace));
        assert_eq!(decode("[]"), Err(CodecError::MissingOpeningBrace));
        assert_eq!(decode("{"), Err(CodecError::MissingClosingBrace));
        assert_eq!(decode(r#"{"k":1"#), Err(CodecError::MissingClosingBrace));
        assert_eq!(
            decode(r#"{"k" 1}"#),
            Err(CodecError::MissingSeparator {
                key: "k".to_string()
            })
        );
        assert_eq!(
            decode(r#"{"k":1.5}"#),
            Err(CodecError::UnexpectedCharacter { found: '.' })
        );
        assert_eq!(
            decode(r#"{"k":}"#),
            Err(CodecError::InvalidValue {
                key: "k".to_string()
            })
        );
        assert_eq!(
            decode(r#"{"k":"v"}"#),
            Err(CodecError::InvalidValue {
                key: "k".to_string()
            })
        );
        assert_eq!(decode(r#"{"k":1} extra"#), Err(CodecError::UnexpectedCharacter { found: 'e' }));
    }

    #[test]
    fn rejects_bad_escapes() {
        assert_eq!(
            decode(r#"{"bad\q":1}"#),
            Err(CodecError::InvalidEscape { found: 'q' })
        );
        assert_eq!(
            decode(r#"{"bad\u12":1}"#),
            Err(CodecError::InvalidUnicodeEscape)
        );
        assert_eq!(
            decode(r#"{"bad\ud800x":1}"#),
            Err(CodecError::InvalidUnicodeEscape)
        );
        assert_eq!(decode(r#"{"open:1}"#), Err(CodecError::UnterminatedKey));
    }

    #[test]
    fn values_outside_i64_range_are_rejected() {
        assert_eq!(
            decode(r#"{"k":9223372036854775808}"#),
            Err(CodecError::InvalidValue {
                key: "k".to_string()
            })
        );
        let decoded = decode(r#"{"k":9223372036854775807}"#).expect("decode");
        assert_eq!(decoded.get("k"), Some(&i64::MAX));
    }
}
