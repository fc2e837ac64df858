use std::fmt::{Debug, Formatter};
use anyhow::bail;
use crate::macros::{make_display, make_string_str_like};
use crate::tree::annotation::Annotation;
use crate::tree::class::ClassName;

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	pub access: FieldAccess,
	pub name: FieldName,
	pub descriptor: FieldDescriptor,

	pub has_deprecated_attribute: bool,
	pub has_synthetic_attribute: bool,

	pub constant_value: Option<ConstantValue>,
	pub signature: Option<FieldSignature>,

	pub runtime_visible_annotations: Vec<Annotation>,
	pub runtime_invisible_annotations: Vec<Annotation>,
}

impl Field {
	pub fn new(access: FieldAccess, name: FieldName, descriptor: FieldDescriptor) -> Field {
		Field {
			access,
			name,
			descriptor,

			has_deprecated_attribute: false,
			has_synthetic_attribute: false,

			constant_value: None,
			signature: None,

			runtime_visible_annotations: Vec::new(),
			runtime_invisible_annotations: Vec::new(),
		}
	}
}

#[derive(Copy, Clone, Default, PartialEq)]
pub struct FieldAccess {
	pub is_public: bool,
	pub is_private: bool,
	pub is_protected: bool,
	pub is_static: bool,
	pub is_final: bool,
	pub is_volatile: bool,
	pub is_transient: bool,
	pub is_synthetic: bool,
	pub is_enum: bool,
}

impl Debug for FieldAccess {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("FieldAccess { ")?;
		if self.is_public    { f.write_str("public ")?; }
		if self.is_private   { f.write_str("private ")?; }
		if self.is_protected { f.write_str("protected ")?; }
		if self.is_static    { f.write_str("static ")?; }
		if self.is_final     { f.write_str("final ")?; }
		if self.is_volatile  { f.write_str("volatile ")?; }
		if self.is_transient { f.write_str("transient ")?; }
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_enum      { f.write_str("enum ")?; }
		f.write_str("}")
	}
}

impl From<u16> for FieldAccess {
	fn from(value: u16) -> Self {
		FieldAccess {
			is_public:    value & 0x0001 != 0,
			is_private:   value & 0x0002 != 0,
			is_protected: value & 0x0004 != 0,
			is_static:    value & 0x0008 != 0,
			is_final:     value & 0x0010 != 0,
			is_volatile:  value & 0x0040 != 0,
			is_transient: value & 0x0080 != 0,
			is_synthetic: value & 0x1000 != 0,
			is_enum:      value & 0x4000 != 0,
		}
	}
}

impl From<FieldAccess> for u16 {
	fn from(value: FieldAccess) -> Self {
		(if value.is_public    { 0x0001 } else { 0 }) |
		(if value.is_private   { 0x0002 } else { 0 }) |
		(if value.is_protected { 0x0004 } else { 0 }) |
		(if value.is_static    { 0x0008 } else { 0 }) |
		(if value.is_final     { 0x0010 } else { 0 }) |
		(if value.is_volatile  { 0x0040 } else { 0 }) |
		(if value.is_transient { 0x0080 } else { 0 }) |
		(if value.is_synthetic { 0x1000 } else { 0 }) |
		(if value.is_enum      { 0x4000 } else { 0 })
	}
}

/// The value of a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
	Integer(i32),
	Float(f32),
	Long(i64),
	Double(f64),
	String(String),
}

/// A reference to a field, as used by the field instructions.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldRef {
	pub class: ClassName,
	pub name: FieldName,
	pub desc: FieldDescriptor,
}

make_string_str_like!(
	pub FieldName(String);
	pub FieldNameSlice(str);
	is_valid(s) = if crate::tree::names::is_valid_unqualified_name(s) {
		Ok(())
	} else {
		bail!("invalid field name: must be non-empty and not contain any of `.`, `;`, `[` and `/`")
	};
);
make_display!(FieldName, FieldNameSlice);

make_string_str_like!(
	/// Represents a field descriptor, like `I` or `[Ljava/lang/String;`.
	///
	/// Use [`FieldDescriptorSlice::parse`] to get the [`Type`][crate::tree::descriptor::Type] out of it.
	pub FieldDescriptor(String);
	pub FieldDescriptorSlice(str);
	is_valid(s) = if crate::tree::descriptor::is_valid_field_descriptor(s) {
		Ok(())
	} else {
		bail!("invalid field descriptor")
	};
);
make_display!(FieldDescriptor, FieldDescriptorSlice);

make_string_str_like!(
	pub FieldSignature(String);
	pub FieldSignatureSlice(str);
	is_valid(s) = if s.is_empty() {
		bail!("invalid field signature: must not be empty")
	} else {
		Ok(())
	};
);
make_display!(FieldSignature, FieldSignatureSlice);

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::tree::field::{FieldAccess, FieldDescriptor, FieldName};

	#[test]
	fn access_round_trip() {
		for value in [0x0001, 0x0019, 0x0042, 0x0084, 0x4019, 0x1000] {
			assert_eq!(u16::from(FieldAccess::from(value)), value);
		}
	}

	#[test]
	fn names_and_descriptors() {
		assert!(FieldName::is_valid("value"));
		assert!(!FieldName::is_valid("a.b"));
		assert!(FieldDescriptor::is_valid("[Ljava/lang/String;"));
		assert!(!FieldDescriptor::is_valid("V"));
		assert!(FieldDescriptor::try_from("Q").is_err());
	}
}
