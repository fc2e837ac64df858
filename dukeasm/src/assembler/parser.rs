//! Parsing of single lines into [`Statement`]s.
//!
//! The mnemonic selects a parser by its [`Family`]. Each parser gets the rest of the line and registers the label
//! and variable names it sees, so that all names are known before anything is resolved.

use std::collections::HashSet;
use log::trace;
use duke::tree::method::{MethodDescriptor, MethodName};
use crate::assembler::labels::LabelTable;
use crate::assembler::literal::{parse_array_type, parse_class_name, parse_constant, parse_constants, parse_field_ref, parse_handle, parse_int, parse_method_ref, take_group};
use crate::assembler::variables::VariableTable;
use crate::ast::code::{InstructionNode, Statement, ThrownException, TryCatch, VariableRef};
use crate::error::{LabelError, LineErrorKind, ParseError, VariableError};
use crate::opcode::{Family, Opcode};

/// The tables names are registered in while parsing.
pub(crate) struct ParseContext<'a> {
	pub(crate) labels: &'a mut LabelTable,
	pub(crate) variables: &'a mut VariableTable,
}

enum Failure {
	Parse(ParseError),
	Other(LineErrorKind),
}

impl From<ParseError> for Failure {
	fn from(value: ParseError) -> Self {
		Failure::Parse(value)
	}
}

impl From<LabelError> for Failure {
	fn from(value: LabelError) -> Self {
		Failure::Other(value.into())
	}
}

impl From<VariableError> for Failure {
	fn from(value: VariableError) -> Self {
		Failure::Other(value.into())
	}
}

/// Returns `true` for blank lines and `//` comments.
pub(crate) fn is_skipped(line: &str) -> bool {
	let line = line.trim();
	line.is_empty() || line.starts_with("//")
}

pub(crate) fn is_valid_symbol(name: &str) -> bool {
	!name.is_empty() && !name.chars().any(|c| c.is_whitespace() || matches!(c, ',' | '[' | ']' | '(' | ')' | '=' | ':' | '"' | '$' | '{' | '}'))
}

fn symbol<'a>(text: &'a str, what: &str) -> Result<&'a str, ParseError> {
	if is_valid_symbol(text) {
		Ok(text)
	} else {
		Err(ParseError::new(text, format!("invalid {what} name")))
	}
}

/// Splits the operand text into exactly `N` whitespace separated tokens.
fn tokens<const N: usize>(text: &str) -> Result<[&str; N], ParseError> {
	let parts: Vec<_> = text.split_whitespace().collect();
	<[&str; N]>::try_from(parts)
		.map_err(|parts| ParseError::new(text, format!("expected {N} operands, got {}", parts.len())))
}

/// Parses one line, which must not be blank or a comment.
pub(crate) fn parse_statement(line: &str, context: &mut ParseContext) -> Result<Statement, LineErrorKind> {
	let line = line.trim();
	let (word, args) = line.split_once(char::is_whitespace)
		.map_or((line, ""), |(word, args)| (word, args.trim()));

	if args.is_empty() && word.len() > 1 {
		if let Some(name) = word.strip_suffix(':') {
			return finish(word, declare_label(name, context));
		}
	}

	let keyword = word.to_ascii_lowercase();
	let result = match keyword.as_str() {
		"label" => declare_label(args.strip_suffix(':').unwrap_or(args).trim(), context),
		"line" => parse_line(args, context),
		"throws" => parse_class_name(args)
			.map(|class| Statement::Throws(ThrownException(class)))
			.map_err(Failure::from),
		"try" => parse_try_catch(args, context),
		_ => {
			let opcode = Opcode::from_mnemonic(word)
				.ok_or_else(|| LineErrorKind::MissingAssembler(word.to_owned()))?;
			trace!("parsing {} with {:?} operands {args:?}", opcode.mnemonic(), opcode.family());
			parse_instruction(opcode, args, context).map(Statement::Instruction)
		},
	};
	finish(word, result)
}

fn finish(word: &str, result: Result<Statement, Failure>) -> Result<Statement, LineErrorKind> {
	result.map_err(|failure| match failure {
		Failure::Parse(error) => LineErrorKind::UnfinishedAssembler {
			mnemonic: word.to_ascii_uppercase(),
			error,
		},
		Failure::Other(kind) => kind,
	})
}

fn declare_label(name: &str, context: &mut ParseContext) -> Result<Statement, Failure> {
	let name = symbol(name, "label")?;
	context.labels.declare(name)?;
	Ok(Statement::Label(name.to_owned()))
}

fn label_reference(name: &str, context: &mut ParseContext) -> Result<String, Failure> {
	let name = symbol(name, "label")?;
	context.labels.register(name)?;
	Ok(name.to_owned())
}

fn parse_line(args: &str, context: &mut ParseContext) -> Result<Statement, Failure> {
	let [label, line] = tokens(args)?;
	let line = parse_int(line)?;
	let line = u16::try_from(line)
		.map_err(|_| ParseError::new(line.to_string(), "line numbers must be in 0..=65535"))?;
	Ok(Statement::Line(label_reference(label, context)?, line))
}

fn parse_try_catch(args: &str, context: &mut ParseContext) -> Result<Statement, Failure> {
	let [start, end, catch, handler] = tokens(args)?;
	let catch_type = catch.get(..6)
		.filter(|prefix| prefix.eq_ignore_ascii_case("catch("))
		.and_then(|_| catch[6..].strip_suffix(')'))
		.ok_or_else(|| ParseError::new(catch, "expected `catch(<type>)` or `catch(*)`"))?;
	let catch_type = match catch_type {
		"*" => None,
		class => Some(parse_class_name(class)?),
	};
	Ok(Statement::TryCatch(TryCatch {
		start: label_reference(start, context)?,
		end: label_reference(end, context)?,
		handler: label_reference(handler, context)?,
		catch_type,
	}))
}

fn variable(name: &str, opcode: Opcode, context: &mut ParseContext) -> Result<VariableRef, Failure> {
	let name = symbol(name, "variable")?;
	let (Some(category), Some(operation)) = (opcode.variable_category(), opcode.variable_operation()) else {
		return Err(ParseError::new(name, format!("{} doesn't take a variable", opcode.mnemonic())).into());
	};
	context.variables.register(name, category)?;
	Ok(VariableRef::new(name, operation))
}

fn parse_instruction(opcode: Opcode, args: &str, context: &mut ParseContext) -> Result<InstructionNode, Failure> {
	match opcode.family() {
		Family::Simple => {
			if args.is_empty() {
				Ok(InstructionNode::Simple(opcode))
			} else {
				Err(ParseError::new(args, "expected no operands").into())
			}
		},
		Family::Int => {
			let [value] = tokens(args)?;
			let value = parse_int(value)?;
			let fits = match opcode {
				Opcode::BiPush => i8::try_from(value).is_ok(),
				_ => i16::try_from(value).is_ok(),
			};
			if !fits {
				return Err(ParseError::new(args, format!("{value} is out of range for {}", opcode.mnemonic())).into());
			}
			Ok(InstructionNode::Int(opcode, value))
		},
		Family::NewArray => {
			let [array_type] = tokens(args)?;
			Ok(InstructionNode::NewArray(parse_array_type(array_type)?))
		},
		Family::Variable => {
			let [name] = tokens(args)?;
			Ok(InstructionNode::Variable(opcode, variable(name, opcode, context)?))
		},
		Family::Increment => {
			let [name, amount] = tokens(args)?;
			let amount = parse_int(amount)?;
			let amount = i16::try_from(amount)
				.map_err(|_| ParseError::new(amount.to_string(), "increment must fit into a short"))?;
			Ok(InstructionNode::Increment(variable(name, opcode, context)?, amount))
		},
		Family::Type => {
			let [class] = tokens(args)?;
			Ok(InstructionNode::Type(opcode, parse_class_name(class)?))
		},
		Family::Field => {
			let [member, desc] = tokens(args)?;
			Ok(InstructionNode::Field(opcode, parse_field_ref(member, desc)?))
		},
		Family::Method => {
			let parts: Vec<_> = args.split_whitespace().collect();
			let (method, itf) = match parts.as_slice() {
				[method] => (*method, false),
				[method, itf] if itf.eq_ignore_ascii_case("itf") => (*method, true),
				_ => return Err(ParseError::new(args, "expected `<owner>.<name><descriptor> [itf]`").into()),
			};
			if itf && !matches!(opcode, Opcode::InvokeStatic | Opcode::InvokeSpecial) {
				return Err(ParseError::new(args, format!("`itf` isn't allowed on {}", opcode.mnemonic())).into());
			}
			Ok(InstructionNode::Method(opcode, parse_method_ref(method)?, itf))
		},
		Family::Jump => {
			let [label] = tokens(args)?;
			Ok(InstructionNode::Jump(opcode, label_reference(label, context)?))
		},
		Family::Ldc => {
			if args.is_empty() {
				return Err(ParseError::new(args, "expected a constant").into());
			}
			Ok(InstructionNode::Ldc(parse_constant(args)?))
		},
		Family::MultiANewArray => {
			let [class, dimensions] = tokens(args)?;
			let class = parse_class_name(class)?;
			let dimensions = parse_int(dimensions)?;
			let dimensions = u8::try_from(dimensions).ok()
				.filter(|&d| d > 0)
				.ok_or_else(|| ParseError::new(dimensions.to_string(), "dimensions must be in 1..=255"))?;
			Ok(InstructionNode::MultiANewArray(class, dimensions))
		},
		Family::TableSwitch => parse_table_switch(args, context),
		Family::LookupSwitch => parse_lookup_switch(args, context),
		Family::InvokeDynamic => parse_invoke_dynamic(args),
	}
}

fn label_list(text: &str, context: &mut ParseContext) -> Result<Vec<String>, Failure> {
	text.split(',')
		.map(str::trim)
		.filter(|x| !x.is_empty())
		.map(|label| label_reference(label, context))
		.collect()
}

fn default_label(rest: &str, context: &mut ParseContext) -> Result<String, Failure> {
	if rest.trim().is_empty() {
		return Err(ParseError::new(rest, "missing `default[<label>]`").into());
	}
	let (default, rest) = take_group(rest, "default")?;
	if !rest.trim().is_empty() {
		return Err(ParseError::new(rest, "unexpected text after the default label").into());
	}
	label_reference(default, context)
}

fn parse_table_switch(args: &str, context: &mut ParseContext) -> Result<InstructionNode, Failure> {
	let (range, rest) = take_group(args, "range")?;
	let (low, high) = range.split_once(':')
		.ok_or_else(|| ParseError::new(range, "expected `<min>:<max>`"))?;
	let low = parse_int(low.trim())?;
	let high = parse_int(high.trim())?;
	if high < low {
		return Err(ParseError::new(range, "the maximum must not be less than the minimum").into());
	}

	let (labels, rest) = take_group(rest, "labels")?;
	let labels = label_list(labels, context)?;
	let expected = i64::from(high) - i64::from(low) + 1;
	if usize::try_from(expected).map_or(true, |expected| expected != labels.len()) {
		return Err(ParseError::new(args, format!("range {low}:{high} needs {expected} labels, got {}", labels.len())).into());
	}

	let default = default_label(rest, context)?;
	Ok(InstructionNode::TableSwitch { low, high, labels, default })
}

fn parse_lookup_switch(args: &str, context: &mut ParseContext) -> Result<InstructionNode, Failure> {
	let (mapping, rest) = take_group(args, "mapping")?;
	let mut keys = HashSet::new();
	let mut pairs = Vec::new();
	for pair in mapping.split(',').map(str::trim).filter(|x| !x.is_empty()) {
		let (key, label) = pair.split_once('=')
			.ok_or_else(|| ParseError::new(pair, "expected `<key>=<label>`"))?;
		let key = parse_int(key.trim())?;
		if !keys.insert(key) {
			return Err(ParseError::new(pair, format!("duplicate key {key}")).into());
		}
		pairs.push((key, label_reference(label.trim(), context)?));
	}

	let default = default_label(rest, context)?;
	Ok(InstructionNode::LookupSwitch { pairs, default })
}

fn parse_invoke_dynamic(args: &str) -> Result<InstructionNode, Failure> {
	let mut parts = args.splitn(3, char::is_whitespace);
	let (Some(name), Some(descriptor), Some(rest)) = (parts.next(), parts.next(), parts.next()) else {
		return Err(ParseError::new(args, "expected `<name> <descriptor> handle[...] args[...]`").into());
	};
	let name = MethodName::try_from(name).map_err(|e| ParseError::new(name, format!("{e:#}")))?;
	let descriptor = MethodDescriptor::try_from(descriptor).map_err(|e| ParseError::new(descriptor, format!("{e:#}")))?;

	let (handle, rest) = take_group(rest, "handle")?;
	let handle = parse_handle(handle)?;
	let (arguments, rest) = take_group(rest, "args")?;
	if !rest.trim().is_empty() {
		return Err(ParseError::new(rest, "unexpected text after the bootstrap arguments").into());
	}
	let arguments = parse_constants(arguments)?;
	Ok(InstructionNode::InvokeDynamic { name, descriptor, handle, arguments })
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::assembler::labels::LabelTable;
	use crate::assembler::parser::{is_skipped, parse_statement, ParseContext};
	use crate::assembler::variables::{Category, VariableTable};
	use crate::ast::code::{Constant, InstructionNode, Statement};
	use crate::ast::Print;
	use crate::error::{LineErrorKind, VariableError};
	use crate::opcode::Opcode;

	struct Tables {
		labels: LabelTable,
		variables: VariableTable,
	}

	impl Tables {
		fn new() -> Tables {
			let mut variables = VariableTable::new();
			variables.setup(false, []).unwrap();
			Tables { labels: LabelTable::new(), variables }
		}

		fn parse(&mut self, line: &str) -> Result<Statement, LineErrorKind> {
			parse_statement(line, &mut ParseContext { labels: &mut self.labels, variables: &mut self.variables })
		}
	}

	fn is_unfinished(result: Result<Statement, LineErrorKind>) -> bool {
		matches!(result, Err(LineErrorKind::UnfinishedAssembler { .. }))
	}

	#[test]
	fn skipped_lines() {
		assert!(is_skipped(""));
		assert!(is_skipped("   \t"));
		assert!(is_skipped("  // comment"));
		assert!(!is_skipped("NOP // trailing"));
	}

	#[test]
	fn unknown_and_malformed() {
		let mut tables = Tables::new();
		assert_eq!(tables.parse("FOO 1"), Err(LineErrorKind::MissingAssembler("FOO".to_owned())));
		assert!(is_unfinished(tables.parse("BIPUSH 127F")));
		assert!(is_unfinished(tables.parse("BIPUSH 128")));
		assert!(is_unfinished(tables.parse("NOP 1")));
		assert!(is_unfinished(tables.parse("MULTIANEWARRAY [[I 0")));
		assert!(is_unfinished(tables.parse("MULTIANEWARRAY [[I -1")));
		assert!(is_unfinished(tables.parse("INVOKEVIRTUAL a/B.c()V itf")));
		assert!(is_unfinished(tables.parse("LDC unsupported[condy]")));
		assert!(is_unfinished(tables.parse("GETFIELD a/B.c")));
	}

	#[test]
	fn case_insensitive() {
		let mut tables = Tables::new();
		assert_eq!(tables.parse("bipush 5"), Ok(Statement::Instruction(InstructionNode::Int(Opcode::BiPush, 5))));
		assert_eq!(tables.parse("sipush -300").map(|x| x.print_plain()).as_deref(), Ok("SIPUSH -300"));
	}

	#[test]
	fn labels() {
		let mut tables = Tables::new();
		assert_eq!(tables.parse("GOTO end"), Ok(Statement::Instruction(InstructionNode::Jump(Opcode::Goto, "end".to_owned()))));
		assert_eq!(tables.parse("LABEL end:"), Ok(Statement::Label("end".to_owned())));
		assert_eq!(tables.parse("start:"), Ok(Statement::Label("start".to_owned())));
		assert!(matches!(tables.parse("label start"), Err(LineErrorKind::Label(_))));
		assert!(is_unfinished(tables.parse("LABEL a,b")));
		assert_eq!(tables.parse("LINE start 12"), Ok(Statement::Line("start".to_owned(), 12)));
		assert!(tables.labels.resolve("end").is_ok());
	}

	#[test]
	fn variables() {
		let mut tables = Tables::new();
		tables.parse("ISTORE x").unwrap();
		tables.parse("IINC x 1").unwrap();
		tables.parse("DSTORE d").unwrap();
		assert_eq!(tables.variables.get("x"), Ok(1));
		assert_eq!(tables.variables.get("d"), Ok(2));
		assert_eq!(tables.variables.max_locals(), 4);
		assert_eq!(tables.variables.category(2), Some(Category::Double));

		assert!(matches!(tables.parse("ASTORE x"), Err(LineErrorKind::Variable(VariableError::TypeConflict { .. }))));
		assert!(matches!(tables.parse("ILOAD this"), Err(LineErrorKind::Variable(VariableError::TypeConflict { .. }))));
		assert!(is_unfinished(tables.parse("ILOAD")));
	}

	#[test]
	fn switches() {
		let mut tables = Tables::new();
		let table = tables.parse("TABLESWITCH range[1:3] labels[A, B, C] default[D]").unwrap();
		assert_eq!(table.print_plain(), "TABLESWITCH range[1:3] labels[A, B, C] default[D]");
		let table = tables.parse("tableswitch [0:0] [A] [B]").unwrap();
		assert_eq!(table.print_plain(), "TABLESWITCH range[0:0] labels[A] default[B]");

		assert!(is_unfinished(tables.parse("TABLESWITCH range[1:3] labels[A, B] default[D]")));
		assert!(is_unfinished(tables.parse("TABLESWITCH range[1:3] labels[A, B, C]")));
		assert!(is_unfinished(tables.parse("TABLESWITCH range[3:1] labels[] default[D]")));

		let lookup = tables.parse("LOOKUPSWITCH mapping[5=A, -1=B] default[C]").unwrap();
		assert_eq!(lookup.print_plain(), "LOOKUPSWITCH mapping[5=A, -1=B] default[C]");
		assert!(is_unfinished(tables.parse("LOOKUPSWITCH mapping[5=A, 5=B] default[C]")));
		assert!(is_unfinished(tables.parse("LOOKUPSWITCH mapping[5=A]")));
		assert!(tables.parse("LOOKUPSWITCH mapping[] default[C]").is_ok());
	}

	#[test]
	fn constants_and_members() {
		let mut tables = Tables::new();
		assert_eq!(tables.parse("LDC \"hello world\""),
			Ok(Statement::Instruction(InstructionNode::Ldc(Constant::String("hello world".to_owned())))));
		for line in [
			"GETSTATIC java/lang/System.out Ljava/io/PrintStream;",
			"INVOKEVIRTUAL java/io/PrintStream.println(Ljava/lang/String;)V",
			"INVOKESTATIC a/I.m()V itf",
			"NEWARRAY I",
			"ANEWARRAY [Ljava/lang/String;",
			"MULTIANEWARRAY [[I 2",
			"LDC handle[H_GETSTATIC a/B.c I]",
			"throws java/io/IOException",
			"try A B catch(*) C",
			"try A B catch(java/lang/Exception) C",
			"INVOKEDYNAMIC run ()Ljava/lang/Runnable; \
				handle[H_INVOKESTATIC java/lang/invoke/LambdaMetafactory.metafactory (Ljava/lang/invoke/MethodHandles$Lookup;Ljava/lang/String;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodType;Ljava/lang/invoke/MethodHandle;Ljava/lang/invoke/MethodType;)Ljava/lang/invoke/CallSite;] \
				args[()V, handle[H_INVOKESTATIC a/B.lambda$0 ()V], ()V]",
		] {
			let statement = tables.parse(line).unwrap_or_else(|e| panic!("{line}: {e}"));
			assert_eq!(statement.print_plain(), line, "printing of {line}");
		}
		assert!(is_unfinished(tables.parse("try A B catch(x.y) C")));
		assert!(is_unfinished(tables.parse("try A B C")));
	}
}
