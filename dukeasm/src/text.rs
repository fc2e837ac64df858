//! Literal text helpers shared by printing and parsing.

/// Escapes a string for use between double quotes.
///
/// ```
/// use dukeasm::text::escape;
/// assert_eq!(escape("a\"b\n\u{1}"), "a\\\"b\\n\\u0001");
/// ```
pub fn escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'"' => out.push_str("\\\""),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			'\u{8}' => out.push_str("\\b"),
			'\u{c}' => out.push_str("\\f"),
			c if c.is_control() => {
				let mut buf = [0u16; 2];
				for unit in c.encode_utf16(&mut buf) {
					out.push_str(&format!("\\u{unit:04x}"));
				}
			},
			c => out.push(c),
		}
	}
	out
}

/// The inverse of [`escape`].
///
/// ```
/// use dukeasm::text::unescape;
/// assert_eq!(unescape("a\\\"b\\n\\u0041").unwrap(), "a\"b\nA");
/// assert!(unescape("\\q").is_err());
/// ```
pub fn unescape(s: &str) -> Result<String, String> {
	let mut out = String::with_capacity(s.len());
	let mut chars = s.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('\\') => out.push('\\'),
			Some('"') => out.push('"'),
			Some('\'') => out.push('\''),
			Some('n') => out.push('\n'),
			Some('r') => out.push('\r'),
			Some('t') => out.push('\t'),
			Some('b') => out.push('\u{8}'),
			Some('f') => out.push('\u{c}'),
			Some('u') => {
				let hex: String = chars.by_ref().take(4).collect();
				let unit = u16::from_str_radix(&hex, 16)
					.map_err(|_| format!("invalid unicode escape `\\u{hex}`"))?;
				// surrogate pairs are written as two escapes
				let decoded = if (0xd800..0xdc00).contains(&unit) {
					let rest: String = chars.by_ref().take(6).collect();
					let low = rest.strip_prefix("\\u")
						.and_then(|low| u16::from_str_radix(low, 16).ok())
						.ok_or_else(|| format!("unpaired surrogate `\\u{hex}`"))?;
					String::from_utf16(&[unit, low])
						.map_err(|_| format!("invalid surrogate pair `\\u{hex}{rest}`"))?
				} else {
					String::from_utf16(&[unit])
						.map_err(|_| format!("unpaired surrogate `\\u{hex}`"))?
				};
				out.push_str(&decoded);
			},
			Some(c) => return Err(format!("unknown escape `\\{c}`")),
			None => return Err("dangling `\\` at the end".to_owned()),
		}
	}
	Ok(out)
}

pub(crate) fn float_literal(value: f32) -> String {
	if value.is_nan() {
		"NaNF".to_owned()
	} else if value.is_infinite() {
		if value > 0.0 { "InfinityF" } else { "-InfinityF" }.to_owned()
	} else {
		format!("{value:?}F")
	}
}

pub(crate) fn double_literal(value: f64) -> String {
	if value.is_nan() {
		"NaND".to_owned()
	} else if value.is_infinite() {
		if value > 0.0 { "InfinityD" } else { "-InfinityD" }.to_owned()
	} else {
		format!("{value:?}D")
	}
}

/// A number literal with its kind given by the suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
}

fn special_float(s: &str) -> Option<f64> {
	match s {
		"NaN" => Some(f64::NAN),
		"Infinity" | "+Infinity" => Some(f64::INFINITY),
		"-Infinity" => Some(f64::NEG_INFINITY),
		_ => None,
	}
}

/// Parses `1`, `1L`, `1.5F`, `1.5D` or `1.5` (a double).
pub(crate) fn parse_number(s: &str) -> Result<Number, String> {
	let invalid = |kind: &str| format!("{s:?} is not a valid {kind} literal");

	if let Some(rest) = s.strip_suffix(['L', 'l']) {
		rest.parse().map(Number::Long).map_err(|_| invalid("long"))
	} else if let Some(rest) = s.strip_suffix(['F', 'f']) {
		special_float(rest).map(|x| x as f32)
			.map_or_else(|| rest.parse(), Ok)
			.map(Number::Float)
			.map_err(|_| invalid("float"))
	} else if let Some(rest) = s.strip_suffix(['D', 'd']) {
		special_float(rest)
			.map_or_else(|| rest.parse(), Ok)
			.map(Number::Double)
			.map_err(|_| invalid("double"))
	} else if s.contains(['.', 'e', 'E']) || special_float(s).is_some() {
		special_float(s)
			.map_or_else(|| s.parse(), Ok)
			.map(Number::Double)
			.map_err(|_| invalid("double"))
	} else {
		s.parse().map(Number::Int).map_err(|_| invalid("int"))
	}
}

/// Splits at top level commas, ignoring commas in brackets and string literals.
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
	let mut parts = Vec::new();
	let mut depth = 0usize;
	let mut in_string = false;
	let mut escaped = false;
	let mut start = 0;
	for (i, c) in s.char_indices() {
		if in_string {
			match c {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_string = false,
				_ => {},
			}
			continue;
		}
		match c {
			'"' => in_string = true,
			'[' | '(' => depth += 1,
			']' | ')' => depth = depth.saturating_sub(1),
			',' if depth == 0 => {
				parts.push(s[start..i].trim());
				start = i + 1;
			},
			_ => {},
		}
	}
	let last = s[start..].trim();
	if !last.is_empty() || !parts.is_empty() {
		parts.push(last);
	}
	parts
}

/// Returns the text between the first and the last double quote, if there are two.
pub(crate) fn quoted(s: &str) -> Option<&str> {
	let start = s.find('"')?;
	let end = s.rfind('"')?;
	(end > start).then(|| &s[start + 1..end])
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::text::{double_literal, escape, float_literal, parse_number, quoted, split_top_level, unescape, Number};

	#[test]
	fn escape_round_trip() {
		for s in ["", "plain", "tab\tnew\nline", "quote \" backslash \\", "\u{0}\u{1f}", "emoji \u{1F600}"] {
			assert_eq!(unescape(&escape(s)).as_deref(), Ok(s));
		}
		assert_eq!(unescape("\\ud83d\\ude00").as_deref(), Ok("\u{1F600}"));
		assert!(unescape("\\ud83d").is_err());
		assert!(unescape("abc\\").is_err());
	}

	#[test]
	fn numbers() {
		assert_eq!(parse_number("12"), Ok(Number::Int(12)));
		assert_eq!(parse_number("-12"), Ok(Number::Int(-12)));
		assert_eq!(parse_number("12L"), Ok(Number::Long(12)));
		assert_eq!(parse_number("1.5F"), Ok(Number::Float(1.5)));
		assert_eq!(parse_number("1.5D"), Ok(Number::Double(1.5)));
		assert_eq!(parse_number("1.5"), Ok(Number::Double(1.5)));
		assert_eq!(parse_number("-InfinityF"), Ok(Number::Float(f32::NEG_INFINITY)));
		assert!(matches!(parse_number("NaND"), Ok(Number::Double(x)) if x.is_nan()));
		assert!(parse_number("2147483648").is_err());
		assert!(parse_number("abc").is_err());
		assert!(parse_number("1.5L").is_err());
	}

	#[test]
	fn float_literals_parse_back() {
		for value in [0.0f32, -0.0, 1.0, 0.1, 1e20, -3.25e-7, f32::MAX, f32::INFINITY] {
			assert_eq!(parse_number(&float_literal(value)), Ok(Number::Float(value)));
		}
		for value in [0.0f64, 1.0, 0.1, 1e300, -2.5e-300, f64::NEG_INFINITY] {
			assert_eq!(parse_number(&double_literal(value)), Ok(Number::Double(value)));
		}
	}

	#[test]
	fn splitting() {
		assert_eq!(split_top_level("A, B,C"), vec!["A", "B", "C"]);
		assert_eq!(split_top_level("\"a, b\", handle[H_GETFIELD a.b I], 1"), vec!["\"a, b\"", "handle[H_GETFIELD a.b I]", "1"]);
		assert_eq!(split_top_level(""), Vec::<&str>::new());
		assert_eq!(quoted("alias x \"a \"b\" c\""), Some("a \"b\" c"));
		assert_eq!(quoted("no quotes"), None);
	}
}
