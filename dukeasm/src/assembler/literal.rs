//! Parsing of operands shared by several instruction families.

use duke::tree::class::ClassName;
use duke::tree::field::{FieldDescriptor, FieldName, FieldRef};
use duke::tree::method::code::{ArrayType, Handle};
use duke::tree::method::{MethodDescriptor, MethodName, MethodRef};
use crate::ast::code::Constant;
use crate::error::ParseError;
use crate::text::{parse_number, split_top_level, Number};

pub(crate) fn parse_int(text: &str) -> Result<i32, ParseError> {
	match parse_number(text) {
		Ok(Number::Int(value)) => Ok(value),
		Ok(_) => Err(ParseError::new(text, "expected an int literal without suffix")),
		Err(detail) => Err(ParseError::new(text, detail)),
	}
}

pub(crate) fn parse_class_name(text: &str) -> Result<ClassName, ParseError> {
	ClassName::try_from(text).map_err(|e| ParseError::new(text, format!("{e:#}")))
}

fn parse_method_descriptor(text: &str) -> Result<MethodDescriptor, ParseError> {
	MethodDescriptor::try_from(text).map_err(|e| ParseError::new(text, format!("{e:#}")))
}

pub(crate) fn parse_field_descriptor(text: &str) -> Result<FieldDescriptor, ParseError> {
	FieldDescriptor::try_from(text).map_err(|e| ParseError::new(text, format!("{e:#}")))
}

pub(crate) fn parse_array_type(text: &str) -> Result<ArrayType, ParseError> {
	let mut chars = text.chars();
	let from_char = match (chars.next(), chars.next()) {
		(Some(c), None) => ArrayType::from_descriptor_char(c),
		_ => None,
	};
	from_char.or(match text {
		"boolean" => Some(ArrayType::Boolean),
		"char" => Some(ArrayType::Char),
		"float" => Some(ArrayType::Float),
		"double" => Some(ArrayType::Double),
		"byte" => Some(ArrayType::Byte),
		"short" => Some(ArrayType::Short),
		"int" => Some(ArrayType::Int),
		"long" => Some(ArrayType::Long),
		_ => None,
	}).ok_or_else(|| ParseError::new(text, "expected a primitive type, like `I` or `int`"))
}

/// Splits `owner.name` at the last dot.
fn owner_and_name(text: &str) -> Result<(ClassName, &str), ParseError> {
	let (owner, name) = text.rsplit_once('.')
		.ok_or_else(|| ParseError::new(text, "expected `<owner>.<name>`"))?;
	Ok((parse_class_name(owner)?, name))
}

/// Parses `owner.name` and a descriptor.
pub(crate) fn parse_field_ref(member: &str, desc: &str) -> Result<FieldRef, ParseError> {
	let (class, name) = owner_and_name(member)?;
	let name = FieldName::try_from(name).map_err(|e| ParseError::new(member, format!("{e:#}")))?;
	Ok(FieldRef { class, name, desc: parse_field_descriptor(desc)? })
}

/// Parses `owner.name(desc)ret`.
pub(crate) fn parse_method_ref(text: &str) -> Result<MethodRef, ParseError> {
	let open = text.find('(').ok_or_else(|| ParseError::new(text, "expected `<owner>.<name><descriptor>`"))?;
	parse_method_ref_parts(&text[..open], &text[open..])
}

fn parse_method_ref_parts(member: &str, desc: &str) -> Result<MethodRef, ParseError> {
	let (class, name) = owner_and_name(member)?;
	let name = MethodName::try_from(name).map_err(|e| ParseError::new(member, format!("{e:#}")))?;
	Ok(MethodRef { class, name, desc: parse_method_descriptor(desc)? })
}

/// Takes a `prefix[...]` group off the start of `text`, returning the contents and the rest.
///
/// The prefix may be left out, and may be followed by whitespace. Brackets nest, and brackets in string literals are
/// ignored.
pub(crate) fn take_group<'a>(text: &'a str, prefix: &str) -> Result<(&'a str, &'a str), ParseError> {
	let text = text.trim_start();
	let open = text.find('[')
		.ok_or_else(|| ParseError::new(text, format!("expected a `{prefix}[...]` group")))?;
	let written_prefix = text[..open].trim_end();
	if !written_prefix.is_empty() && !written_prefix.eq_ignore_ascii_case(prefix) {
		return Err(ParseError::new(text, format!("expected a `{prefix}[...]` group, got `{written_prefix}`")));
	}

	let mut depth = 0usize;
	let mut in_string = false;
	let mut escaped = false;
	for (i, c) in text.char_indices().skip(open) {
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
			'[' => depth += 1,
			']' => {
				depth -= 1;
				if depth == 0 {
					return Ok((text[open + 1..i].trim(), &text[i + 1..]));
				}
			},
			_ => {},
		}
	}
	Err(ParseError::new(text, format!("unclosed `{prefix}[` group")))
}

/// Parses `<tag> <owner>.<name> <descriptor> [itf]`, the contents of a `handle[...]` group.
pub(crate) fn parse_handle(text: &str) -> Result<Handle, ParseError> {
	let parts: Vec<_> = text.split_whitespace().collect();
	let (tag, member, desc, itf) = match parts.as_slice() {
		[tag, member, desc] => (*tag, *member, *desc, false),
		[tag, member, desc, itf] if itf.eq_ignore_ascii_case("itf") => (*tag, *member, *desc, true),
		_ => return Err(ParseError::new(text, "expected `<tag> <owner>.<name> <descriptor> [itf]`")),
	};
	let tag = tag.to_ascii_uppercase();
	let tag = tag.strip_prefix("H_").unwrap_or(&tag);
	let handle = match tag {
		"GETFIELD" => Handle::GetField(parse_field_ref(member, desc)?),
		"GETSTATIC" => Handle::GetStatic(parse_field_ref(member, desc)?),
		"PUTFIELD" => Handle::PutField(parse_field_ref(member, desc)?),
		"PUTSTATIC" => Handle::PutStatic(parse_field_ref(member, desc)?),
		"INVOKEVIRTUAL" => Handle::InvokeVirtual(parse_method_ref_parts(member, desc)?),
		"INVOKESTATIC" => Handle::InvokeStatic(parse_method_ref_parts(member, desc)?, itf),
		"INVOKESPECIAL" => Handle::InvokeSpecial(parse_method_ref_parts(member, desc)?, itf),
		"NEWINVOKESPECIAL" => Handle::NewInvokeSpecial(parse_method_ref_parts(member, desc)?),
		"INVOKEINTERFACE" => Handle::InvokeInterface(parse_method_ref_parts(member, desc)?),
		_ => return Err(ParseError::new(text, format!("unknown handle tag `{tag}`"))),
	};
	if itf && !matches!(handle, Handle::InvokeStatic(..) | Handle::InvokeSpecial(..)) {
		return Err(ParseError::new(text, "`itf` is only allowed on static and special method handles"));
	}
	Ok(handle)
}

/// Parses a constant of `LDC` or a bootstrap argument.
pub(crate) fn parse_constant(text: &str) -> Result<Constant, ParseError> {
	let text = text.trim();
	let lower = text.to_ascii_lowercase();

	if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
		Ok(Constant::String(text[1..text.len() - 1].to_owned()))
	} else if lower.starts_with("handle") && text.contains('[') {
		let (inner, rest) = take_group(text, "handle")?;
		if !rest.trim().is_empty() {
			return Err(ParseError::new(text, "unexpected text after the handle"));
		}
		Ok(Constant::Handle(parse_handle(inner)?))
	} else if lower.starts_with("unsupported[") {
		Err(ParseError::new(text, "this constant can't be assembled"))
	} else if text.starts_with('(') {
		Ok(Constant::MethodType(parse_method_descriptor(text)?))
	} else if text.starts_with('[') {
		Ok(Constant::Class(parse_class_name(text)?))
	} else if let Some(name) = text.strip_prefix('L').and_then(|x| x.strip_suffix(';')) {
		Ok(Constant::Class(parse_class_name(name)?))
	} else {
		match parse_number(text) {
			Ok(Number::Int(x)) => Ok(Constant::Int(x)),
			Ok(Number::Long(x)) => Ok(Constant::Long(x)),
			Ok(Number::Float(x)) => Ok(Constant::Float(x)),
			Ok(Number::Double(x)) => Ok(Constant::Double(x)),
			Err(detail) => Err(ParseError::new(text, detail)),
		}
	}
}

/// Parses the comma separated contents of an `args[...]` group.
pub(crate) fn parse_constants(text: &str) -> Result<Vec<Constant>, ParseError> {
	split_top_level(text).into_iter()
		.map(parse_constant)
		.collect()
}
