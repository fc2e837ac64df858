use std::iter::Peekable;
use std::str::Chars;
use anyhow::{anyhow, bail, Context, Result};
use crate::tree::class::ClassName;
use crate::tree::field::{FieldDescriptor, FieldDescriptorSlice};
use crate::tree::method::{MethodDescriptor, MethodDescriptorSlice};

/// Represents a type.
///
/// In case of an array, use the [`Type::Array`] variant.
///
/// ```
/// use duke::tree::descriptor::{ArrayType, Type};
///
/// // the type of a java `int`
/// let int_type = Type::I;
///
/// // the type of a java `int[][]`
/// let int_array_type = Type::Array(2, ArrayType::I);
///
/// assert_ne!(int_type, int_array_type);
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Type {
	/// A `byte`. In rust, this is a `i8`.
	B,
	/// A `char`.
	C,
	/// A `double`. In rust, this is a `f64`.
	D,
	/// A `float`. In rust, this is a `f32`.
	F,
	/// An `int`. In rust, this is a `i32`.
	I,
	/// A `long`. In rust, this is a `i64`.
	J,
	/// A `short`. In rust, this is a `i16`.
	S,
	/// A `boolean`. In rust, this is a `bool`.
	Z,
	/// An instance of the class specified by [`ClassName`].
	Object(ClassName),
	/// An array type, represented by the dimension and the inner [`ArrayType`].
	Array(u8, ArrayType),
}

impl Type {
	/// Returns the number of local variable slots (or operand stack words) a value of this type takes.
	///
	/// ```
	/// use duke::tree::descriptor::Type;
	/// assert_eq!(Type::J.size(), 2);
	/// assert_eq!(Type::Z.size(), 1);
	/// ```
	pub fn size(&self) -> u16 {
		match self {
			Type::D | Type::J => 2,
			_ => 1,
		}
	}

	/// Returns `true` for object and array types.
	pub fn is_reference(&self) -> bool {
		matches!(self, Type::Object(_) | Type::Array(_, _))
	}
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ArrayType {
	B,
	C,
	D,
	F,
	I,
	J,
	S,
	Z,
	Object(ClassName),
}

// The grammar for descriptors is:
//   FieldDescriptor:
//     FieldType
//
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(chars: &mut Peekable<Chars>) -> Result<Type> {
	let mut array_dimension: u8 = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension = array_dimension.checked_add(1)
			.ok_or_else(|| anyhow!("array dimension of descriptor exceeds 255"))?;
	}

	let char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
	let array_type = match char {
		'B' => ArrayType::B,
		'C' => ArrayType::C,
		'D' => ArrayType::D,
		'F' => ArrayType::F,
		'I' => ArrayType::I,
		'J' => ArrayType::J,
		'S' => ArrayType::S,
		'Z' => ArrayType::Z,
		'L' => {
			let mut s = String::new();

			let mut char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			while char != ';' {
				s.push(char);

				char = chars.next().ok_or_else(|| anyhow!("unexpected abrupt ending of descriptor"))?;
			}

			if s.starts_with('[') || !crate::tree::names::is_valid_class_name(&s) {
				bail!("invalid class name {s:?} in descriptor");
			}
			// SAFETY: We just checked that it's a valid object class name.
			ArrayType::Object(unsafe { ClassName::from_inner_unchecked(s) })
		},
		x => {
			bail!("unexpected char {x:?} in descriptor");
		}
	};

	if array_dimension == 0 {
		Ok(match array_type {
			ArrayType::B => Type::B,
			ArrayType::C => Type::C,
			ArrayType::D => Type::D,
			ArrayType::F => Type::F,
			ArrayType::I => Type::I,
			ArrayType::J => Type::J,
			ArrayType::S => Type::S,
			ArrayType::Z => Type::Z,
			ArrayType::Object(class_name) => Type::Object(class_name),
		})
	} else {
		Ok(Type::Array(array_dimension, array_type))
	}
}

fn write_field_type(t: &Type, string: &mut String) {
	fn write_array_type(array_type: &ArrayType, string: &mut String) {
		match array_type {
			ArrayType::B => string.push('B'),
			ArrayType::C => string.push('C'),
			ArrayType::D => string.push('D'),
			ArrayType::F => string.push('F'),
			ArrayType::I => string.push('I'),
			ArrayType::J => string.push('J'),
			ArrayType::S => string.push('S'),
			ArrayType::Z => string.push('Z'),
			ArrayType::Object(class_name) => {
				string.push('L');
				string.push_str(class_name.as_inner());
				string.push(';');
			},
		}
	}

	match t {
		Type::B => string.push('B'),
		Type::C => string.push('C'),
		Type::D => string.push('D'),
		Type::F => string.push('F'),
		Type::I => string.push('I'),
		Type::J => string.push('J'),
		Type::S => string.push('S'),
		Type::Z => string.push('Z'),
		Type::Object(class_name) => write_array_type(&ArrayType::Object(class_name.clone()), string),
		Type::Array(array_dimension, array_type) => {
			for _ in 0..*array_dimension {
				string.push('[');
			}
			write_array_type(array_type, string);
		},
	}
}

/// Checks that the whole of `x` is exactly one field type.
pub(crate) fn is_valid_field_descriptor(x: &str) -> bool {
	let mut chars = x.chars().peekable();
	read_field_type(&mut chars).is_ok() && chars.peek().is_none()
}

pub(crate) fn is_valid_method_descriptor(x: &str) -> bool {
	read_method_descriptor(x).is_ok()
}

fn read_method_descriptor(x: &str) -> Result<ParsedMethodDescriptor> {
	let mut chars = x.chars().peekable();

	if chars.next_if_eq(&'(').is_none() {
		bail!("method descriptor {x:?} doesn't start with '('");
	}

	let mut parameter_descriptors = Vec::new();
	loop {
		if chars.next_if_eq(&')').is_some() {
			break;
		}

		let descriptor = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read parameter descriptor of {x:?}"))?;
		parameter_descriptors.push(descriptor);
	}

	let return_descriptor = if chars.next_if_eq(&'V').is_some() {
		None
	} else {
		let descriptor = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read return descriptor of {x:?}"))?;

		Some(descriptor)
	};

	if chars.peek().is_some() {
		bail!("expected end of method descriptor {x:?}, got {:?} remaining", String::from_iter(chars));
	}

	Ok(ParsedMethodDescriptor {
		parameter_descriptors,
		return_descriptor,
	})
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedFieldDescriptor(pub Type);

impl FieldDescriptorSlice {
	/// Attempts to parse a field descriptor.
	///
	/// A field descriptor is defined by the [grammar](https://docs.oracle.com/javase/specs/jvms/se22/html/jvms-4.html#jvms-4.3.2) in the
	/// Java Virtual Machine Specification.
	///
	/// The inverse of this function is [`ParsedFieldDescriptor::write`].
	///
	/// # Examples
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use duke::tree::class::ClassName;
	/// use duke::tree::descriptor::{ArrayType, ParsedFieldDescriptor, Type};
	/// use duke::tree::field::FieldDescriptor;
	///
	/// let int: FieldDescriptor = "I".parse().unwrap();
	/// assert_eq!(int.parse().unwrap(), ParsedFieldDescriptor(Type::I));
	///
	/// let object: FieldDescriptor = "Ljava/lang/Object;".parse().unwrap();
	/// assert_eq!(object.parse().unwrap(), ParsedFieldDescriptor(Type::Object(ClassName::JAVA_LANG_OBJECT.to_owned())));
	///
	/// let double_array: FieldDescriptor = "[[[D".parse().unwrap();
	/// assert_eq!(double_array.parse().unwrap(), ParsedFieldDescriptor(Type::Array(3, ArrayType::D)));
	/// assert_eq!(double_array, double_array.parse().unwrap().write());
	/// ```
	pub fn parse(&self) -> Result<ParsedFieldDescriptor> {
		let mut chars = self.as_inner().chars().peekable();

		let descriptor = read_field_type(&mut chars)
			.with_context(|| anyhow!("failed to read field descriptor {self:?}"))?;

		if chars.peek().is_some() {
			bail!("expected end of field descriptor {self:?}, got {:?} remaining", String::from_iter(chars));
		}

		Ok(ParsedFieldDescriptor(descriptor))
	}
}

impl ParsedFieldDescriptor {
	/// Writes a field descriptor.
	///
	/// The inverse of this function is [`FieldDescriptorSlice::parse`].
	pub fn write(&self) -> FieldDescriptor {
		let mut s = String::new();
		write_field_type(&self.0, &mut s);
		// SAFETY: A written field type is always a valid field descriptor.
		unsafe { FieldDescriptor::from_inner_unchecked(s) }
	}
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ParsedMethodDescriptor {
	pub parameter_descriptors: Vec<Type>,
	/// The return type, or [`None`] for `void`.
	pub return_descriptor: Option<Type>,
}

impl MethodDescriptorSlice {
	/// Attempts to parse a method descriptor.
	///
	/// ```
	/// # use pretty_assertions::assert_eq;
	/// use duke::tree::descriptor::Type;
	/// use duke::tree::method::MethodDescriptor;
	///
	/// let desc: MethodDescriptor = "(IJ[Z)V".parse().unwrap();
	/// let parsed = desc.parse().unwrap();
	/// assert_eq!(parsed.parameter_descriptors.len(), 3);
	/// assert_eq!(parsed.return_descriptor, None);
	/// assert_eq!(parsed.write(), desc);
	/// ```
	pub fn parse(&self) -> Result<ParsedMethodDescriptor> {
		read_method_descriptor(self.as_inner())
	}

	/// Returns the size of the arguments, not including an implicit `this`.
	///
	/// Doubles and longs count 2 instead of 1.
	pub fn get_arguments_size(&self) -> Result<u16> {
		Ok(self.parse()?.parameter_descriptors.iter().map(Type::size).sum())
	}
}

impl ParsedMethodDescriptor {
	pub fn write(&self) -> MethodDescriptor {
		let mut s = String::new();
		s.push('(');
		for parameter_descriptor in &self.parameter_descriptors {
			write_field_type(parameter_descriptor, &mut s);
		}
		s.push(')');
		if let Some(return_descriptor) = &self.return_descriptor {
			write_field_type(return_descriptor, &mut s);
		} else {
			s.push('V');
		}
		// SAFETY: A written list of field types and return type is always a valid method descriptor.
		unsafe { MethodDescriptor::from_inner_unchecked(s) }
	}
}
