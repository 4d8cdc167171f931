//! Rendering of FIDL literals as Dart source.

use crate::error::{FidlgenError, Result};
use brine_fidl_schema::Literal;

pub fn format_literal(literal: &Literal) -> Result<String> {
    match literal {
        Literal::String { value } => Ok(quote_dart_string(value)),
        Literal::Numeric { value } => format_numeric(value),
        Literal::True => Ok("true".to_string()),
        Literal::False => Ok("false".to_string()),
        Literal::Default => Ok("default".to_string()),
    }
}

/// Positive decimal integers are re-rendered in hex: Dart integers are
/// signed 64-bit, and values above `i64::MAX` only parse as hex literals.
pub fn format_numeric(value: &str) -> Result<String> {
    if value.starts_with("0x") || value.starts_with("0b") {
        return Ok(value.to_string());
    }
    if value.contains('.') || value.starts_with('-') {
        return Ok(value.to_string());
    }
    let num: u64 = value
        .parse()
        .map_err(|_| FidlgenError::InvalidNumericLiteral(value.to_string()))?;
    Ok(format!("0x{:x}", num))
}

/// Double-quoted Dart string literal. `$` is escaped to keep it from being
/// read as interpolation.
pub fn quote_dart_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(value: &str) -> Literal {
        Literal::Numeric { value: value.to_string() }
    }

    #[test]
    fn numeric_literals() {
        let cases = [
            ("10", "0xa"),
            ("-1", "-1"),
            ("0xA", "0xA"),
            ("0b101", "0b101"),
            ("1.23", "1.23"),
            ("18446744073709551615", "0xffffffffffffffff"),
        ];
        for (input, expected) in cases {
            assert_eq!(format_literal(&numeric(input)).unwrap(), expected, "input {}", input);
        }
    }

    #[test]
    fn unparsable_numeric_literal_is_an_error() {
        let err = format_literal(&numeric("12abc")).unwrap_err();
        assert!(matches!(err, FidlgenError::InvalidNumericLiteral(ref v) if v == "12abc"));
        assert!(format_literal(&numeric("18446744073709551616")).is_err());
    }

    #[test]
    fn keyword_literals() {
        assert_eq!(format_literal(&Literal::True).unwrap(), "true");
        assert_eq!(format_literal(&Literal::False).unwrap(), "false");
        assert_eq!(format_literal(&Literal::Default).unwrap(), "default");
    }

    #[test]
    fn string_literals_are_escaped() {
        let lit = Literal::String { value: "say \"hi\" to $name\n\\".to_string() };
        assert_eq!(format_literal(&lit).unwrap(), r#""say \"hi\" to \$name\n\\""#);
        assert_eq!(quote_dart_string("\u{1}"), r#""\x01""#);
        assert_eq!(quote_dart_string("héllo"), "\"héllo\"");
    }
}
