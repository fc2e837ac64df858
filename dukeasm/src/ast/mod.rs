//! The syntax nodes of classes, fields, methods and code.
//!
//! Every node prints itself through a [`PrintContext`], which decides how keywords, mnemonics, names and literals
//! look, but never changes the structure of the text. Printing the same node twice gives the same text.

pub mod annotation;
pub mod class;
pub mod code;
pub mod field;
pub mod method;
pub mod modifier;

use crate::ast::annotation::Annotation;
use crate::ast::modifier::Modifiers;

/// Formatting policy for printing.
pub trait PrintContext {
	/// Directive keywords, like `class`, `method` or `try`.
	fn keyword(&self, s: &str) -> String;
	fn mnemonic(&self, s: &str) -> String;
	/// Class, member, label and variable names.
	fn name(&self, s: &str) -> String;
	fn literal(&self, s: &str) -> String;
}

/// Prints text as it is.
#[derive(Debug, Copy, Clone, Default)]
pub struct Plain;

impl PrintContext for Plain {
	fn keyword(&self, s: &str) -> String {
		s.to_owned()
	}

	fn mnemonic(&self, s: &str) -> String {
		s.to_owned()
	}

	fn name(&self, s: &str) -> String {
		s.to_owned()
	}

	fn literal(&self, s: &str) -> String {
		s.to_owned()
	}
}

/// Colours text with ANSI escape codes, for terminals.
#[derive(Debug, Copy, Clone, Default)]
pub struct Ansi;

impl Ansi {
	fn paint(code: &str, s: &str) -> String {
		format!("\x1b[{code}m{s}\x1b[0m")
	}
}

impl PrintContext for Ansi {
	fn keyword(&self, s: &str) -> String {
		Ansi::paint("1;34", s)
	}

	fn mnemonic(&self, s: &str) -> String {
		Ansi::paint("35", s)
	}

	fn name(&self, s: &str) -> String {
		s.to_owned()
	}

	fn literal(&self, s: &str) -> String {
		Ansi::paint("32", s)
	}
}

/// A node that can be printed in canonical form.
pub trait Print {
	fn print(&self, context: &dyn PrintContext) -> String;

	fn print_plain(&self) -> String {
		self.print(&Plain)
	}
}

/// A declaration of a class, a field or a method.
pub trait Definition: Print {
	fn name(&self) -> &str;
	fn modifiers(&self) -> &Modifiers;
	fn annotations(&self) -> &[Annotation];
	fn signature(&self) -> Option<&str>;
	fn is_deprecated(&self) -> bool;

	fn is_class(&self) -> bool {
		false
	}
	fn is_field(&self) -> bool {
		false
	}
	fn is_method(&self) -> bool {
		false
	}
	fn is_member(&self) -> bool {
		!self.is_class() && (self.is_field() || self.is_method())
	}

	/// The descriptor of the definition.
	fn desc(&self) -> String;
}

/// Prints the annotation, `signature` and `deprecated` lines that precede a definition.
pub(crate) fn print_definition_prefix(definition: &dyn Definition, context: &dyn PrintContext, out: &mut String) {
	for annotation in definition.annotations() {
		out.push_str(&annotation.print(context));
		out.push('\n');
	}
	if let Some(signature) = definition.signature() {
		out.push_str(&format!("{} {}\n", context.keyword("signature"), context.literal(signature)));
	}
	if definition.is_deprecated() {
		out.push_str(&context.keyword("deprecated"));
		out.push('\n');
	}
}

/// Joins `keyword` and the non-empty parts with single spaces.
pub(crate) fn join_line(context: &dyn PrintContext, keyword: &str, parts: &[String]) -> String {
	let mut line = context.keyword(keyword);
	for part in parts.iter().filter(|part| !part.is_empty()) {
		line.push(' ');
		line.push_str(part);
	}
	line
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::ast::{Ansi, Plain, PrintContext};

	#[test]
	fn ansi_keeps_the_text() {
		let ansi = Ansi.keyword("class");
		assert!(ansi.contains("class"));
		assert!(ansi.starts_with('\x1b'));
		assert_eq!(Plain.keyword("class"), "class");

		let stripped: String = ansi.split('\x1b')
			.map(|part| part.split_once('m').map_or(part, |(_, rest)| rest))
			.collect();
		assert_eq!(stripped, "class");
	}
}
