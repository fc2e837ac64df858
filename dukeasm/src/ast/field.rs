use duke::tree::field::{FieldDescriptor, FieldName};
use crate::ast::{join_line, print_definition_prefix, Definition, Print, PrintContext};
use crate::ast::annotation::Annotation;
use crate::ast::modifier::Modifiers;
use crate::text::{double_literal, float_literal};

/// The constant value of a field.
///
/// Strings are kept in their escaped form, exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstVal {
	String(String),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
}

impl Print for ConstVal {
	fn print(&self, context: &dyn PrintContext) -> String {
		context.literal(&match self {
			ConstVal::String(s) => format!("\"{s}\""),
			ConstVal::Int(x) => x.to_string(),
			ConstVal::Long(x) => format!("{x}L"),
			ConstVal::Float(x) => float_literal(*x),
			ConstVal::Double(x) => double_literal(*x),
		})
	}
}

/// A field, printed as `field <modifiers> <name> <descriptor>`, with ` = <value>` for a constant value.
///
/// The constant value is kept even if the field isn't `static`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
	pub modifiers: Modifiers,
	pub annotations: Vec<Annotation>,
	pub signature: Option<String>,
	pub deprecated: bool,
	pub name: FieldName,
	pub descriptor: FieldDescriptor,
	pub constant_value: Option<ConstVal>,
}

impl FieldDefinition {
	pub fn new(modifiers: Modifiers, name: FieldName, descriptor: FieldDescriptor) -> FieldDefinition {
		FieldDefinition {
			modifiers,
			annotations: Vec::new(),
			signature: None,
			deprecated: false,
			name,
			descriptor,
			constant_value: None,
		}
	}
}

impl Definition for FieldDefinition {
	fn name(&self) -> &str {
		self.name.as_inner()
	}

	fn modifiers(&self) -> &Modifiers {
		&self.modifiers
	}

	fn annotations(&self) -> &[Annotation] {
		&self.annotations
	}

	fn signature(&self) -> Option<&str> {
		self.signature.as_deref()
	}

	fn is_deprecated(&self) -> bool {
		self.deprecated
	}

	fn is_field(&self) -> bool {
		true
	}

	fn desc(&self) -> String {
		self.descriptor.as_inner().to_owned()
	}
}

impl Print for FieldDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mut out = String::new();
		print_definition_prefix(self, context, &mut out);
		out.push_str(&join_line(context, "field", &[
			self.modifiers.print(context),
			context.name(self.name.as_inner()),
			context.name(self.descriptor.as_inner()),
		]));
		if let Some(value) = &self.constant_value {
			out.push_str(" = ");
			out.push_str(&value.print(context));
		}
		out
	}
}
