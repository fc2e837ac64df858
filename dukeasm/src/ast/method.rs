use duke::tree::field::FieldDescriptor;
use duke::tree::method::{MethodDescriptor, MethodName};
use crate::ast::{join_line, print_definition_prefix, Definition, Print, PrintContext};
use crate::ast::annotation::Annotation;
use crate::ast::code::{Code, ThrownException, VariableRef};
use crate::assembler::parser::is_valid_symbol;
use crate::ast::modifier::{Modifier, ModifierTarget, Modifiers};
use crate::error::ParseError;
use crate::opcode::VariableOperation;

/// A declared parameter. It's also the first assignment of the variable named like it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
	pub desc: FieldDescriptor,
	pub name: String,
}

impl MethodParameter {
	pub fn as_variable(&self) -> VariableRef {
		VariableRef::new(self.name.clone(), VariableOperation::Write)
	}
}

/// A method, printed as
/// ```text
/// method <modifiers> <name>(<desc> <name>, ...)<return desc>
/// throws <type>
/// <statements>
/// end
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
	pub modifiers: Modifiers,
	pub annotations: Vec<Annotation>,
	pub signature: Option<String>,
	pub deprecated: bool,
	pub name: MethodName,
	pub parameters: Vec<MethodParameter>,
	/// The return type, or [`None`] for `void`.
	pub return_type: Option<FieldDescriptor>,
	pub throws: Vec<ThrownException>,
	/// The body, [`None`] for abstract and native methods.
	pub code: Option<Code>,
}

impl MethodDefinition {
	pub fn new(modifiers: Modifiers, name: MethodName, parameters: Vec<MethodParameter>, return_type: Option<FieldDescriptor>) -> MethodDefinition {
		MethodDefinition {
			modifiers,
			annotations: Vec::new(),
			signature: None,
			deprecated: false,
			name,
			parameters,
			return_type,
			throws: Vec::new(),
			code: None,
		}
	}

	pub fn descriptor(&self) -> MethodDescriptor {
		// SAFETY: Parameter and return types are valid field descriptors, so the concatenation is a valid method
		// descriptor.
		unsafe { MethodDescriptor::from_inner_unchecked(self.desc()) }
	}

	fn print_header(&self, context: &dyn PrintContext) -> String {
		let parameters: Vec<_> = self.parameters.iter()
			.map(|p| format!("{} {}", context.name(p.desc.as_inner()), context.name(&p.name)))
			.collect();
		let return_type = self.return_type.as_ref().map_or("V", |x| x.as_inner());
		join_line(context, "method", &[
			self.modifiers.print(context),
			format!("{}({}){}", context.name(self.name.as_inner()), parameters.join(", "), context.name(return_type)),
		])
	}

	/// Parses a `method <modifiers> <name>(<desc> <name>, ...)<return desc>` line.
	///
	/// ```
	/// use dukeasm::ast::method::MethodDefinition;
	/// use dukeasm::ast::Definition;
	///
	/// let method = MethodDefinition::parse_header("method public static max(I a, I b)I").unwrap();
	/// assert_eq!(method.name(), "max");
	/// assert_eq!(method.desc(), "(II)I");
	/// assert_eq!(method.parameters[1].name, "b");
	/// ```
	pub fn parse_header(line: &str) -> Result<MethodDefinition, ParseError> {
		let line = line.trim();
		let fail = |detail: &str| ParseError::new(line, detail);

		let rest = line.split_once(char::is_whitespace)
			.filter(|(keyword, _)| keyword.eq_ignore_ascii_case("method"))
			.map(|(_, rest)| rest.trim())
			.ok_or_else(|| fail("expected a `method` header"))?;

		let open = rest.find('(').ok_or_else(|| fail("missing `(`"))?;
		let close = rest.rfind(')').filter(|&close| close > open).ok_or_else(|| fail("missing `)`"))?;

		let (modifiers, name) = match rest[..open].trim_end().rsplit_once(char::is_whitespace) {
			Some((modifiers, name)) => (modifiers, name),
			None => ("", rest[..open].trim_end()),
		};
		let modifiers = Modifiers::parse(modifiers, ModifierTarget::Method)
			.map_err(|word| fail(&format!("unknown method modifier {word:?}")))?;
		let name = MethodName::try_from(name)
			.map_err(|e| fail(&e.to_string()))?;

		// slot numbers as parameter names must be the slot the parameter is passed in
		let mut slot: u32 = if modifiers.contains(Modifier::Static) { 0 } else { 1 };
		let parameters = rest[open + 1..close].split(',')
			.map(str::trim)
			.filter(|x| !x.is_empty())
			.map(|parameter| {
				let (desc, name) = parameter.split_once(char::is_whitespace)
					.ok_or_else(|| fail(&format!("parameter {parameter:?} needs a descriptor and a name")))?;
				let desc = FieldDescriptor::try_from(desc)
					.map_err(|e| fail(&e.to_string()))?;
				let name = name.trim();
				if !is_valid_symbol(name) {
					return Err(fail(&format!("invalid parameter name {name:?}")));
				}
				if name.bytes().all(|b| b.is_ascii_digit()) && name.parse::<u32>().ok() != Some(slot) {
					return Err(fail(&format!("parameter {name:?} is passed in slot {slot}")));
				}
				slot += if matches!(desc.as_inner(), "J" | "D") { 2 } else { 1 };
				Ok(MethodParameter { desc, name: name.to_owned() })
			})
			.collect::<Result<Vec<_>, _>>()?;

		let return_type = match rest[close + 1..].trim() {
			"V" => None,
			desc => Some(FieldDescriptor::try_from(desc).map_err(|e| fail(&e.to_string()))?),
		};

		Ok(MethodDefinition::new(modifiers, name, parameters, return_type))
	}
}

impl Definition for MethodDefinition {
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

	fn is_method(&self) -> bool {
		true
	}

	fn desc(&self) -> String {
		let mut desc = String::from("(");
		for parameter in &self.parameters {
			desc.push_str(parameter.desc.as_inner());
		}
		desc.push(')');
		desc.push_str(self.return_type.as_ref().map_or("V", |x| x.as_inner()));
		desc
	}
}

impl Print for MethodDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mut out = String::new();
		print_definition_prefix(self, context, &mut out);
		out.push_str(&self.print_header(context));
		out.push('\n');
		for thrown in &self.throws {
			out.push_str(&thrown.print(context));
			out.push('\n');
		}
		if let Some(code) = &self.code {
			let body = code.print(context);
			if !body.is_empty() {
				out.push_str(&body);
				out.push('\n');
			}
		}
		out.push_str(&context.keyword("end"));
		out
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::ast::code::{Code, InstructionNode, Statement, ThrownException};
	use crate::ast::method::MethodDefinition;
	use crate::ast::{Definition, Print};
	use crate::opcode::Opcode;

	#[test]
	fn parse_and_print_header() {
		let mut method = MethodDefinition::parse_header("METHOD public <init>(Ljava/lang/String; s, [J longs)V").unwrap();
		assert_eq!(method.desc(), "(Ljava/lang/String;[J)V");
		assert_eq!(method.descriptor().as_inner(), "(Ljava/lang/String;[J)V");
		assert!(method.is_member());
		assert!(!method.is_class());

		method.throws.push(ThrownException("java/io/IOException".parse().unwrap()));
		method.code = Some(Code { statements: vec![Statement::Instruction(InstructionNode::Simple(Opcode::Return))] });
		assert_eq!(method.print_plain(), "\
			method public <init>(Ljava/lang/String; s, [J longs)V\n\
			throws java/io/IOException\n\
			RETURN\n\
			end");

		let printed = method.print_plain();
		let header = printed.lines().next().unwrap();
		assert_eq!(MethodDefinition::parse_header(header).unwrap().parameters, method.parameters);
	}

	#[test]
	fn bad_headers() {
		for header in [
			"function x()V",
			"method x(V",
			"method x(I)",
			"method const x()V",
			"method x(I)Q",
			"method x(I a, b)V",
			"method a.b()V",
			"method volatile x()V",
			"method x(I a b)I",
			"method x(I a=b)I",
		] {
			assert!(MethodDefinition::parse_header(header).is_err(), "{header}");
		}
		let method = MethodDefinition::parse_header("method run()V").unwrap();
		assert!(method.modifiers.is_empty());
		assert_eq!(method.return_type, None);
	}

	#[test]
	fn parameter_slot_numbers() {
		let names = |header: &str| MethodDefinition::parse_header(header)
			.map(|method| method.parameters.into_iter().map(|p| p.name).collect::<Vec<_>>());

		assert_eq!(names("method static f(J 0, I 2)I").unwrap(), vec!["0", "2"]);
		assert_eq!(names("method f(D 1, [I 3, I x)V").unwrap(), vec!["1", "3", "x"]);
		assert!(names("method static f(J 0, I 1)I").is_err());
		assert!(names("method static f(I 5)I").is_err());
		assert!(names("method f(I 0)V").is_err());
	}
}
