use indexmap::IndexMap;
use duke::tree::annotation::{ElementValue, Object};
use crate::ast::{Print, PrintContext};
use crate::text::{double_literal, escape, float_literal};

/// An annotation on a class, a member, or a record component.
///
/// Prints as `annotation <type> name=value, ...`, with `invisible-annotation` for annotations not retained at
/// runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
	/// `true` for runtime retained annotations.
	pub visible: bool,
	/// The type as a field descriptor, like `Ljava/lang/Deprecated;`.
	pub type_name: String,
	pub arguments: IndexMap<String, AnnotationArgument>,
}

/// The kind of a literal annotation argument.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LiteralKind {
	Byte,
	Char,
	Short,
	Int,
	Long,
	Float,
	Double,
	Boolean,
	String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationArgument {
	/// A literal, with its text already formatted (and escaped for strings).
	Literal {
		kind: LiteralKind,
		text: String,
	},
	Enum {
		type_name: String,
		constant: String,
	},
	/// A class literal, given as return descriptor.
	Class(String),
	Annotation(Annotation),
	Array(Vec<AnnotationArgument>),
}

impl AnnotationArgument {
	fn from_element_value(value: &ElementValue) -> AnnotationArgument {
		let literal = |kind, text: String| AnnotationArgument::Literal { kind, text };
		match value {
			ElementValue::Object(object) => match object {
				Object::Byte(x) => literal(LiteralKind::Byte, x.to_string()),
				Object::Char(x) => {
					let c = char::from_u32(u32::from(*x))
						.map_or_else(|| format!("\\u{x:04x}"), |c| escape(&c.to_string()));
					literal(LiteralKind::Char, c)
				},
				Object::Short(x) => literal(LiteralKind::Short, x.to_string()),
				Object::Integer(x) => literal(LiteralKind::Int, x.to_string()),
				Object::Long(x) => literal(LiteralKind::Long, x.to_string()),
				Object::Float(x) => literal(LiteralKind::Float, float_literal(*x)),
				Object::Double(x) => literal(LiteralKind::Double, double_literal(*x)),
				Object::Boolean(x) => literal(LiteralKind::Boolean, x.to_string()),
				Object::String(x) => literal(LiteralKind::String, escape(x)),
			},
			ElementValue::Enum { type_name, const_name } => AnnotationArgument::Enum {
				type_name: type_name.as_inner().to_owned(),
				constant: const_name.clone(),
			},
			ElementValue::Class(class) => AnnotationArgument::Class(class.clone()),
			ElementValue::AnnotationInterface(annotation) =>
				AnnotationArgument::Annotation(Annotation::from_duke(annotation, true)),
			ElementValue::ArrayType(values) =>
				AnnotationArgument::Array(values.iter().map(AnnotationArgument::from_element_value).collect()),
		}
	}
}

impl Print for AnnotationArgument {
	fn print(&self, context: &dyn PrintContext) -> String {
		match self {
			AnnotationArgument::Literal { kind, text } => context.literal(&match kind {
				LiteralKind::Byte => format!("(byte) {text}"),
				LiteralKind::Short => format!("(short) {text}"),
				LiteralKind::Char => format!("'{text}'"),
				LiteralKind::Long => format!("{text}L"),
				LiteralKind::String => format!("\"{text}\""),
				LiteralKind::Int | LiteralKind::Float | LiteralKind::Double | LiteralKind::Boolean => text.clone(),
			}),
			AnnotationArgument::Enum { type_name, constant } =>
				format!("{}[{} {}]", context.keyword("enum"), context.name(type_name), context.name(constant)),
			AnnotationArgument::Class(class) =>
				format!("{}[{}]", context.keyword("class"), context.name(class)),
			AnnotationArgument::Annotation(annotation) =>
				format!("{}[{}]", context.keyword("annotation"), annotation.print_body(context)),
			AnnotationArgument::Array(values) => {
				let values: Vec<_> = values.iter().map(|value| value.print(context)).collect();
				format!("[{}]", values.join(", "))
			},
		}
	}
}

impl Annotation {
	/// Converts an annotation of the class file tree.
	///
	/// A nested annotation has no retention of its own; it's marked visible.
	pub fn from_duke(annotation: &duke::tree::annotation::Annotation, visible: bool) -> Annotation {
		Annotation {
			visible,
			type_name: annotation.annotation_type.as_inner().to_owned(),
			arguments: annotation.element_value_pairs.iter()
				.map(|pair| (pair.name.clone(), AnnotationArgument::from_element_value(&pair.value)))
				.collect(),
		}
	}

	/// Converts both the visible and invisible annotations, visible ones first.
	pub fn all_from_duke(visible: &[duke::tree::annotation::Annotation], invisible: &[duke::tree::annotation::Annotation]) -> Vec<Annotation> {
		visible.iter().map(|x| Annotation::from_duke(x, true))
			.chain(invisible.iter().map(|x| Annotation::from_duke(x, false)))
			.collect()
	}

	fn print_body(&self, context: &dyn PrintContext) -> String {
		let mut s = context.name(&self.type_name);
		let arguments: Vec<_> = self.arguments.iter()
			.map(|(name, value)| format!("{}={}", context.name(name), value.print(context)))
			.collect();
		if !arguments.is_empty() {
			s.push(' ');
			s.push_str(&arguments.join(", "));
		}
		s
	}
}

impl Print for Annotation {
	fn print(&self, context: &dyn PrintContext) -> String {
		let keyword = if self.visible { "annotation" } else { "invisible-annotation" };
		format!("{} {}", context.keyword(keyword), self.print_body(context))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::tree::annotation::{ElementValue, ElementValuePair, Object};
	use crate::ast::annotation::Annotation;
	use crate::ast::Print;

	#[test]
	fn print_converted() {
		let mut inner = duke::tree::annotation::Annotation::new("Lb/Inner;".parse().unwrap());
		inner.element_value_pairs.push(ElementValuePair {
			name: "x".to_owned(),
			value: ElementValue::Object(Object::Char(u16::from(b'q'))),
		});

		let mut annotation = duke::tree::annotation::Annotation::new("La/Anno;".parse().unwrap());
		annotation.element_value_pairs.push(ElementValuePair {
			name: "value".to_owned(),
			value: ElementValue::Object(Object::String("a\"b".to_owned())),
		});
		annotation.element_value_pairs.push(ElementValuePair {
			name: "kind".to_owned(),
			value: ElementValue::Enum { type_name: "La/Kind;".parse().unwrap(), const_name: "FAST".to_owned() },
		});
		annotation.element_value_pairs.push(ElementValuePair {
			name: "numbers".to_owned(),
			value: ElementValue::ArrayType(vec![
				ElementValue::Object(Object::Long(3)),
				ElementValue::Object(Object::Byte(-1)),
			]),
		});
		annotation.element_value_pairs.push(ElementValuePair {
			name: "nested".to_owned(),
			value: ElementValue::AnnotationInterface(inner),
		});
		annotation.element_value_pairs.push(ElementValuePair {
			name: "type".to_owned(),
			value: ElementValue::Class("Ljava/lang/String;".to_owned()),
		});

		let converted = Annotation::from_duke(&annotation, false);
		assert_eq!(
			converted.print_plain(),
			"invisible-annotation La/Anno; value=\"a\\\"b\", kind=enum[La/Kind; FAST], numbers=[3L, (byte) -1], \
			nested=annotation[Lb/Inner; x='q'], type=class[Ljava/lang/String;]"
		);
		assert_eq!(converted.print_plain(), converted.print_plain());
	}
}
