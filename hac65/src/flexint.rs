//! Parsing for the flexible integer literal syntax accepted on the command
//! line and inside `.aro` overlay files: decimal, `$`/`0x` hex, C-style
//! octal, and `'c` character literals.

use crate::error::{Hac65Error, Hac65Result};
use std::sync::OnceLock;

fn syntax_regex() -> &'static regex::Regex {
	static RE: OnceLock<regex::Regex> = OnceLock::new();
	RE.get_or_init(|| {
		regex::Regex::new(r"^[-+]?(\$[0-9A-Fa-f]{1,4}|0[xX][0-9A-Fa-f]{1,4}|0[0-7]{0,6}|[1-9][0-9]{0,4}|'.)$")
			.expect("flex-integer syntax regex is a fixed, valid pattern")
	})
}

/// Parse a flex-integer literal into a `u16`.
///
/// Accepted forms:
/// - decimal: `1234`, `0` (up to 5 digits)
/// - hex: `$1a2b`, `0x1A2B` (1-4 hex digits)
/// - octal: `0777` (C-style, leading zero, up to 6 further digits)
/// - character: `'A` (the ASCII code of the single character following `'`)
///
/// An optional leading `+` or `-` negates the parsed magnitude, narrowed to
/// `u16` as two's complement -- a value too wide for 16 bits is truncated
/// rather than rejected, matching the `strtoul`-then-cast behavior of the
/// original parser.
pub fn parse_u16(text: &str) -> Hac65Result<u16> {
	if !syntax_regex().is_match(text) {
		return Err(Hac65Error::Usage(format!("'{text}' is not a valid integer literal")));
	}

	let (negative, digits) = match text.strip_prefix('-') {
		Some(rest) => (true, rest),
		None => (false, text.strip_prefix('+').unwrap_or(text)),
	};

	let value: u64 = if let Some(rest) = digits.strip_prefix('\'') {
		let ch = rest.chars().next().expect("regex guarantees exactly one character follows '");
		u64::from(ch as u32)
	} else if let Some(rest) = digits.strip_prefix('$') {
		u64::from_str_radix(rest, 16).expect("regex guarantees valid hex digits")
	} else if let Some(rest) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
		u64::from_str_radix(rest, 16).expect("regex guarantees valid hex digits")
	} else if digits.len() > 1 && digits.starts_with('0') {
		u64::from_str_radix(digits, 8).expect("regex guarantees valid octal digits")
	} else {
		digits.parse().expect("regex guarantees valid decimal digits")
	};

	let narrowed = value as u16;
	Ok(if negative { narrowed.wrapping_neg() } else { narrowed })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_plain_decimal() {
		assert_eq!(parse_u16("4660").unwrap(), 4660);
	}

	#[test]
	fn parses_dollar_hex() {
		assert_eq!(parse_u16("$1234").unwrap(), 0x1234);
	}

	#[test]
	fn parses_0x_hex_case_insensitively() {
		assert_eq!(parse_u16("0x1A2b").unwrap(), 0x1A2B);
	}

	#[test]
	fn parses_c_style_octal() {
		assert_eq!(parse_u16("0777").unwrap(), 0o777);
	}

	#[test]
	fn parses_character_literal_as_ascii_code() {
		assert_eq!(parse_u16("'A").unwrap(), 65);
	}

	#[test]
	fn rejects_too_many_hex_digits() {
		assert!(parse_u16("$10000").is_err());
	}

	#[test]
	fn rejects_garbage() {
		assert!(parse_u16("not-a-number").is_err());
		assert!(parse_u16("").is_err());
	}

	#[test]
	fn applies_a_leading_plus_sign() {
		assert_eq!(parse_u16("+100").unwrap(), 100);
	}

	#[test]
	fn negates_and_narrows_a_leading_minus_sign() {
		assert_eq!(parse_u16("-1").unwrap(), 0xFFFF);
		assert_eq!(parse_u16("-2").unwrap(), 0xFFFE);
	}
}
