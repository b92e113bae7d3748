//! Type decoder table
//!
//! Maps an `ldms_ls` value-type tag (`u8` .. `s64`, `f32`, `d64`, `char`,
//! `char[]` and the `[]` array variants) to a pure conversion from the raw
//! token printed in the listing to a typed [`Value`].

use crate::error::DecodeError;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Numeric element type shared by scalar and array tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    F32,
    D64,
}

impl ScalarType {
    pub const ALL: [ScalarType; 10] = [
        ScalarType::U8,
        ScalarType::S8,
        ScalarType::U16,
        ScalarType::S16,
        ScalarType::U32,
        ScalarType::S32,
        ScalarType::U64,
        ScalarType::S64,
        ScalarType::F32,
        ScalarType::D64,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ScalarType::U8 => "u8",
            ScalarType::S8 => "s8",
            ScalarType::U16 => "u16",
            ScalarType::S16 => "s16",
            ScalarType::U32 => "u32",
            ScalarType::S32 => "s32",
            ScalarType::U64 => "u64",
            ScalarType::S64 => "s64",
            ScalarType::F32 => "f32",
            ScalarType::D64 => "d64",
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::D64)
    }

    fn decode(self, token: &str) -> Option<Value> {
        if self.is_float() {
            strip_separators(token, 10)?.parse::<f64>().ok().map(Value::Float)
        } else {
            parse_int_literal(token).map(Value::Int)
        }
    }
}

/// A value-type tag as printed in the second column of a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `char`, a single quoted character
    Char,
    /// `char[]`, a double quoted string
    CharArray,
    Scalar(ScalarType),
    Array(ScalarType),
}

impl ValueType {
    /// Decode `raw` under this type.
    ///
    /// Integer tags accept the same literals as an `int(x, 0)` style parser:
    /// an optional sign, then `0x`/`0o`/`0b` prefixed digits or a decimal
    /// number without leading zeros. Values are kept as `i128` so the whole
    /// `u64` and `s64` ranges fit; widths are not range-checked.
    pub fn decode(self, raw: &str) -> Result<Value, DecodeError> {
        match self {
            ValueType::Char => Ok(Value::Str(strip_quote_layer(raw, '\'').to_string())),
            ValueType::CharArray => Ok(Value::Str(strip_quote_layer(raw, '"').to_string())),
            ValueType::Scalar(scalar) => {
                scalar.decode(raw).ok_or_else(|| DecodeError::invalid(self, raw))
            }
            ValueType::Array(scalar) => raw
                .split(',')
                .map(|element| {
                    scalar
                        .decode(element.trim())
                        .ok_or_else(|| DecodeError::invalid_element(self, raw, element))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
        }
    }

    /// Whether the listing prints a unit suffix after values of this type
    pub fn has_unit_suffix(self) -> bool {
        self != ValueType::CharArray
    }
}

impl FromStr for ValueType {
    type Err = DecodeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "char" => return Ok(ValueType::Char),
            "char[]" => return Ok(ValueType::CharArray),
            _ => {}
        }
        let (base, is_array) = match tag.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (tag, false),
        };
        let scalar = ScalarType::ALL
            .into_iter()
            .find(|scalar| scalar.tag() == base)
            .ok_or_else(|| DecodeError::unsupported(tag))?;
        Ok(if is_array { ValueType::Array(scalar) } else { ValueType::Scalar(scalar) })
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Char => f.write_str("char"),
            ValueType::CharArray => f.write_str("char[]"),
            ValueType::Scalar(scalar) => f.write_str(scalar.tag()),
            ValueType::Array(scalar) => write!(f, "{}[]", scalar.tag()),
        }
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A decoded metric value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i128),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decode `raw` under the type named by `tag`
pub fn decode(tag: &str, raw: &str) -> Result<Value, DecodeError> {
    tag.parse::<ValueType>()?.decode(raw)
}

fn strip_quote_layer(token: &str, quote: char) -> &str {
    let token = token.strip_prefix(quote).unwrap_or(token);
    token.strip_suffix(quote).unwrap_or(token)
}

fn parse_int_literal(token: &str) -> Option<i128> {
    let (negative, body) = if let Some(rest) = token.strip_prefix('-') {
        (true, rest)
    } else {
        (false, token.strip_prefix('+').unwrap_or(token))
    };

    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        _ => (10, body),
    };
    // a prefixed literal may put one separator right after the prefix
    let digits = if radix == 10 { digits } else { digits.strip_prefix('_').unwrap_or(digits) };
    let digits = strip_separators(digits, radix)?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    // "007" is ambiguous between octal and decimal, so only all-zero runs may lead with 0
    if radix == 10 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
        return None;
    }

    let magnitude = i128::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Remove `_` digit separators, each of which must sit between two digits
fn strip_separators(token: &str, radix: u32) -> Option<Cow<'_, str>> {
    if !token.contains('_') {
        return Some(Cow::Borrowed(token));
    }
    let is_digit = |b: Option<&u8>| b.is_some_and(|b| char::from(*b).is_digit(radix));
    let bytes = token.as_bytes();
    let valid = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'_')
        .all(|(idx, _)| idx > 0 && is_digit(bytes.get(idx - 1)) && is_digit(bytes.get(idx + 1)));
    valid.then(|| Cow::Owned(token.replace('_', "")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literals() {
        assert_eq!(decode("u32", "42").unwrap(), Value::Int(42));
        assert_eq!(decode("u32", "0x2A").unwrap(), Value::Int(42));
        assert_eq!(decode("u32", "0X2a").unwrap(), Value::Int(42));
        assert_eq!(decode("u8", "0o17").unwrap(), Value::Int(15));
        assert_eq!(decode("u8", "0b101").unwrap(), Value::Int(5));
        assert_eq!(decode("s64", "-9223372036854775808").unwrap(), Value::Int(i64::MIN as i128));
        assert_eq!(decode("u64", "18446744073709551615").unwrap(), Value::Int(u64::MAX as i128));
        assert_eq!(decode("s16", "+7").unwrap(), Value::Int(7));
        assert_eq!(decode("u16", "0").unwrap(), Value::Int(0));
        assert_eq!(decode("u16", "000").unwrap(), Value::Int(0));
    }

    #[test]
    fn test_digit_separators() {
        assert_eq!(decode("u32", "1_000").unwrap(), Value::Int(1000));
        assert_eq!(decode("u32", "0x_ff_ff").unwrap(), Value::Int(0xffff));
        assert_eq!(decode("u8", "0b1_0").unwrap(), Value::Int(2));
        assert_eq!(decode("s32", "-1_0").unwrap(), Value::Int(-10));
        assert_eq!(decode("d64", "1_000.5").unwrap(), Value::Float(1000.5));
        for bad in ["_1", "1_", "1__0", "0_7", "0x_", "0x__1", "1_x"] {
            assert!(decode("u32", bad).is_err(), "{bad:?}");
        }
        assert!(decode("d64", "1e_5").is_err());
        assert!(decode("d64", "1_.5").is_err());
    }

    #[test]
    fn test_invalid_integers() {
        for bad in ["bad", "", "0x", "1.5", "007", "12abc", "--1", "0xZZ"] {
            let err = decode("u32", bad).unwrap_err();
            assert!(matches!(err, DecodeError::InvalidValue { .. }), "{bad:?} -> {err:?}");
        }
    }

    #[test]
    #[allow(clippy::approx_constant)]
    fn test_floats() {
        assert_eq!(decode("f32", "3.14").unwrap(), Value::Float(3.14));
        assert_eq!(decode("d64", "-1e3").unwrap(), Value::Float(-1000.0));
        assert_eq!(decode("d64", "2").unwrap(), Value::Float(2.0));
        assert!(decode("d64", "1.2.3").is_err());
        assert!(decode("f32", "abc").is_err());
    }

    #[test]
    fn test_characters() {
        assert_eq!(decode("char", "'a'").unwrap(), Value::Str("a".to_string()));
        assert_eq!(decode("char", "b").unwrap(), Value::Str("b".to_string()));
        assert_eq!(
            decode("char[]", "\"hello world\"").unwrap(),
            Value::Str("hello world".to_string())
        );
        // only one layer is removed
        assert_eq!(decode("char[]", "\"\"x\"\"").unwrap(), Value::Str("\"x\"".to_string()));
        assert_eq!(decode("char[]", "").unwrap(), Value::Str(String::new()));
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            decode("s32[]", "1,2,3").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            decode("u8[]", "0x1,0x2").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            decode("d64[]", "1.5,2.5").unwrap(),
            Value::List(vec![Value::Float(1.5), Value::Float(2.5)])
        );

        let err = decode("u16[]", "1,x,3").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidElement {
                value_type: "u16[]".to_string(),
                raw: "1,x,3".to_string(),
                element: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_unsupported_tags() {
        for tag in ["u128", "string", "char[][]", "[]", "U32"] {
            assert!(matches!(decode(tag, "1"), Err(DecodeError::UnsupportedType { .. })), "{tag}");
        }
    }

    #[test]
    fn test_tag_round_trip() {
        for tag in ["char", "char[]", "u8", "s64", "f32", "d64", "u32[]", "d64[]"] {
            let value_type: ValueType = tag.parse().unwrap();
            assert_eq!(value_type.to_string(), tag);
        }
        assert_eq!("s8[]".parse::<ValueType>().unwrap(), ValueType::Array(ScalarType::S8));
    }

    #[test]
    fn test_unit_suffix() {
        assert!(ValueType::Scalar(ScalarType::F32).has_unit_suffix());
        assert!(ValueType::Char.has_unit_suffix());
        assert!(!ValueType::CharArray.has_unit_suffix());
    }

    #[test]
    fn test_value_serialization() {
        let value = Value::List(vec![Value::Int(1), Value::Float(0.5), Value::Str("x".into())]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,0.5,"x"]"#);
        let value_type = ValueType::Array(ScalarType::U64);
        assert_eq!(serde_json::to_string(&value_type).unwrap(), r#""u64[]""#);
    }
}
