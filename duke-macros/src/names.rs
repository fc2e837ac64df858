// keep in sync with the name checking in `duke::tree`

/// Checks if a class name is valid according to JVMS 4.2.1 (also accepting array class names).
pub(crate) fn is_valid_class_name(x: &str) -> Result<(), String> {
	if x.starts_with('[') {
		is_valid_field_descriptor(x)
			.map_err(|e| format!("invalid array class name: {e}"))
	} else {
		// a list of identifiers split by /
		// each identifier must be an unqualified name
		for unqualified_name in x.split('/') {
			// must contain at least one unicode codepoint
			if unqualified_name.is_empty() {
				return Err(format!("invalid class name: empty segment {unqualified_name:?} (split at `/`) not allowed"));
			}
			// must not contain any of . ; [ /
			if unqualified_name.contains(['.', ';', '[', '/']) {
				return Err(format!("invalid class name: segment {unqualified_name:?} (split at `/`) contains on of `.`, `;` or `[`, which are not allowed"));
			}
		}
		Ok(())
	}
}

/// Checks if a name is an unqualified name according to JVMS 4.2.2
///
/// This is used for field names, formal parameter names, local variable names.
pub(crate) fn is_valid_unqualified_name(x: &str, usage: &str) -> Result<(), String> {
	// must contain at least one unicode codepoint
	if x.is_empty() {
		return Err(format!("invalid {usage} name: empty name not allowed"));
	}
	// must not contain any of . ; [ /
	if x.contains(['.', ';', '[', '/']) {
		return Err(format!("invalid {usage} name: must not contain `.`, `;`, `[` or `/`"));
	}
	Ok(())
}

/// Checks if a method name is valid according to JVMS 4.2.2
pub(crate) fn is_valid_method_name(x: &str) -> Result<(), String> {
	// either one of the special names
	if x == "<init>" || x == "<clinit>" {
		Ok(())
	} else {
		// or an unqualified name with special < > restriction

		// must contain at least one unicode codepoint
		if x.is_empty() {
			return Err("invalid method name: empty name not allowed".to_string());
		}
		// must not contain any of . ; [ / < >
		if x.contains(['.', ';', '[', '/', '<', '>']) {
			return Err("invalid method name: must not contain `.`, `;`, `[`, `/`, `<` or `>`".to_string());
		}
		Ok(())
	}
}

/// Reads one field type from the start of `x`, returning the rest.
fn read_field_type(x: &str) -> Result<&str, String> {
	let rest = x.trim_start_matches('[');
	let dimension = x.len() - rest.len();
	if dimension > 255 {
		return Err("array dimension exceeds 255".to_string());
	}

	let mut chars = rest.chars();
	match chars.next() {
		Some('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z') => Ok(chars.as_str()),
		Some('L') => {
			let rest = chars.as_str();
			let (class_name, rest) = rest.split_once(';')
				.ok_or_else(|| "missing `;` after class name".to_string())?;
			if class_name.starts_with('[') {
				return Err("class name in `L...;` must not be an array".to_string());
			}
			is_valid_class_name(class_name)?;
			Ok(rest)
		},
		Some(c) => Err(format!("unexpected char {c:?} in descriptor")),
		None => Err("unexpected abrupt ending of descriptor".to_string()),
	}
}

pub(crate) fn is_valid_field_descriptor(x: &str) -> Result<(), String> {
	match read_field_type(x)? {
		"" => Ok(()),
		rest => Err(format!("invalid field descriptor: {rest:?} remaining")),
	}
}

pub(crate) fn is_valid_method_descriptor(x: &str) -> Result<(), String> {
	let mut rest = x.strip_prefix('(')
		.ok_or_else(|| "invalid method descriptor: must start with `(`".to_string())?;
	while !rest.starts_with(')') {
		rest = read_field_type(rest).map_err(|e| format!("invalid method descriptor: {e}"))?;
	}
	match &rest[1..] {
		"V" => Ok(()),
		ret => is_valid_field_descriptor(ret).map_err(|e| format!("invalid method descriptor: return type: {e}")),
	}
}

#[cfg(test)]
mod testing {
	use crate::names::{is_valid_class_name, is_valid_field_descriptor, is_valid_method_descriptor};

	#[test]
	fn descriptors() {
		assert!(is_valid_field_descriptor("[[Ljava/lang/String;").is_ok());
		assert!(is_valid_field_descriptor("V").is_err());
		assert!(is_valid_method_descriptor("(IJ)V").is_ok());
		assert!(is_valid_method_descriptor("(I").is_err());
		assert!(is_valid_method_descriptor("()").is_err());
		assert!(is_valid_class_name("[I").is_ok());
		assert!(is_valid_class_name("a//b").is_err());
	}
}
