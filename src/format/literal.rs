//! Scalar literal rules.
//!
//! These are shared by tagged document scalars (`!bool yes`) and command-line
//! overrides, so a value reads the same in both places.

use super::{FormatError, Tag};
use crate::tree::{Complex, Timestamp, Value};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const BOOL_LITERALS: &[(&str, bool)] = &[
    ("true", true),
    ("yes", true),
    ("on", true),
    ("false", false),
    ("no", false),
    ("off", false),
];

fn invalid(tag: Tag, text: &str) -> FormatError {
    FormatError::InvalidLiteral { tag, text: text.to_string() }
}

pub fn parse_bool(text: &str) -> Result<bool, FormatError> {
    let trimmed = text.trim();
    BOOL_LITERALS
        .iter()
        .find(|(literal, _)| literal.eq_ignore_ascii_case(trimmed))
        .map(|(_, value)| *value)
        .ok_or_else(|| invalid(Tag::Bool, text))
}

pub fn parse_int(text: &str) -> Result<i64, FormatError> {
    text.trim().parse::<i64>().map_err(|_| invalid(Tag::Int, text))
}

pub fn parse_float(text: &str) -> Result<f64, FormatError> {
    text.trim().parse::<f64>().map_err(|_| invalid(Tag::Float, text))
}

pub fn parse_complex(text: &str) -> Result<Complex, FormatError> {
    text.parse::<Complex>().map_err(|_| invalid(Tag::Complex, text))
}

/// Base64 payload; embedded whitespace and line breaks are ignored.
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, FormatError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|_| invalid(Tag::Bytes, text))
}

pub fn parse_timestamp(text: &str) -> Result<Timestamp, FormatError> {
    Timestamp::parse(text).ok_or_else(|| invalid(Tag::Timestamp, text))
}

/// A null slot accepts any content and stays null.
pub fn parse_null(_text: &str) -> Value {
    Value::Null
}

/// Apply the rule for a scalar tag. Returns `None` for tags that do not
/// describe a scalar literal.
pub(crate) fn parse_scalar(tag: Tag, text: &str) -> Option<Result<Value, FormatError>> {
    let value = match tag {
        Tag::Bool => parse_bool(text).map(Value::Bool),
        Tag::Int => parse_int(text).map(Value::Int),
        Tag::Float => parse_float(text).map(Value::Float),
        Tag::Complex => parse_complex(text).map(Value::Complex),
        Tag::Str => Ok(Value::Str(text.to_string())),
        Tag::Bytes => parse_bytes(text).map(Value::Bytes),
        Tag::Null => Ok(parse_null(text)),
        Tag::Timestamp => parse_timestamp(text).map(Value::Timestamp),
        Tag::List | Tag::Tuple | Tag::Pairs | Tag::Name | Tag::Module => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_literals_are_case_insensitive() {
        for (text, expected) in [("True", true), ("no", false), ("NO", false), ("on", true), ("Off", false)] {
            assert_eq!(parse_bool(text).expect("bool"), expected, "literal {text}");
        }
        assert!(parse_bool("hallo").is_err());
        assert!(parse_bool("1").is_err());
    }

    #[test]
    fn numbers_use_plain_decimal_literals() {
        assert_eq!(parse_int(" 234 ").expect("int"), 234);
        assert!(parse_int("2.5").is_err());
        assert_eq!(parse_float("234.0").expect("float"), 234.0);
        assert!(parse_float("hallo").is_err());
    }

    #[test]
    fn bytes_are_base64() {
        assert_eq!(parse_bytes("aGVs\nbG8=").expect("bytes"), b"hello".to_vec());
        assert!(parse_bytes("not base64!").is_err());
    }

    #[test]
    fn null_ignores_input() {
        assert_eq!(parse_null("anything"), Value::Null);
    }

    #[test]
    fn scalar_dispatch_skips_collection_tags() {
        assert!(parse_scalar(Tag::List, "[1]").is_none());
        assert_eq!(
            parse_scalar(Tag::Str, " kept as is ").expect("scalar tag").expect("str"),
            Value::Str(" kept as is ".to_string())
        );
    }
}
