//! Statements of a method body: instructions, label declarations, line markers, try/catch ranges and thrown
//! exceptions.
//!
//! Names in here are symbolic. Labels and variables are resolved by the assembler.

use duke::tree::class::ClassName;
use duke::tree::field::FieldRef;
use duke::tree::method::code::{ArrayType, Handle};
use duke::tree::method::{MethodDescriptor, MethodName, MethodRef};
use crate::ast::{Print, PrintContext};
use crate::opcode::{Opcode, VariableOperation};
use crate::text::{double_literal, float_literal};

/// A symbolic reference to a local variable, by name or by slot number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
	pub name: String,
	pub operation: VariableOperation,
}

impl VariableRef {
	pub fn new(name: impl Into<String>, operation: VariableOperation) -> VariableRef {
		VariableRef { name: name.into(), operation }
	}
}

/// An operand of `LDC` or a bootstrap argument of `INVOKEDYNAMIC`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	/// The escaped text, without the quotes.
	String(String),
	Class(ClassName),
	MethodType(MethodDescriptor),
	Handle(Handle),
	/// A constant that has no text form, like a dynamic constant. It can be printed, but not assembled.
	Unsupported(String),
}

fn handle_tag(handle: &Handle) -> &'static str {
	match handle {
		Handle::GetField(_) => "H_GETFIELD",
		Handle::GetStatic(_) => "H_GETSTATIC",
		Handle::PutField(_) => "H_PUTFIELD",
		Handle::PutStatic(_) => "H_PUTSTATIC",
		Handle::InvokeVirtual(_) => "H_INVOKEVIRTUAL",
		Handle::InvokeStatic(..) => "H_INVOKESTATIC",
		Handle::InvokeSpecial(..) => "H_INVOKESPECIAL",
		Handle::NewInvokeSpecial(_) => "H_NEWINVOKESPECIAL",
		Handle::InvokeInterface(_) => "H_INVOKEINTERFACE",
	}
}

/// Prints `handle[<tag> <owner>.<name> <descriptor>]`, with ` itf` for interface methods.
pub(crate) fn print_handle(handle: &Handle, context: &dyn PrintContext) -> String {
	let (owner, name, desc, itf) = match handle {
		Handle::GetField(f) | Handle::GetStatic(f) | Handle::PutField(f) | Handle::PutStatic(f) =>
			(&f.class, f.name.as_inner(), f.desc.as_inner(), false),
		Handle::InvokeVirtual(m) | Handle::NewInvokeSpecial(m) | Handle::InvokeInterface(m) =>
			(&m.class, m.name.as_inner(), m.desc.as_inner(), false),
		Handle::InvokeStatic(m, itf) | Handle::InvokeSpecial(m, itf) =>
			(&m.class, m.name.as_inner(), m.desc.as_inner(), *itf),
	};
	format!("{}[{} {} {}{}]",
		context.keyword("handle"),
		context.mnemonic(handle_tag(handle)),
		context.name(&format!("{}.{}", owner.as_inner(), name)),
		context.name(desc),
		if itf { format!(" {}", context.keyword("itf")) } else { String::new() },
	)
}

impl Print for Constant {
	fn print(&self, context: &dyn PrintContext) -> String {
		match self {
			Constant::Int(x) => context.literal(&x.to_string()),
			Constant::Long(x) => context.literal(&format!("{x}L")),
			Constant::Float(x) => context.literal(&float_literal(*x)),
			Constant::Double(x) => context.literal(&double_literal(*x)),
			Constant::String(s) => context.literal(&format!("\"{s}\"")),
			Constant::Class(class) => context.name(class.to_descriptor().as_inner()),
			Constant::MethodType(desc) => context.name(desc.as_inner()),
			Constant::Handle(handle) => print_handle(handle, context),
			Constant::Unsupported(description) => format!("{}[{description}]", context.keyword("unsupported")),
		}
	}
}

/// An instruction with symbolic operands, one variant per instruction family.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionNode {
	Simple(Opcode),
	/// `BIPUSH` and `SIPUSH`.
	Int(Opcode, i32),
	NewArray(ArrayType),
	Variable(Opcode, VariableRef),
	Increment(VariableRef, i16),
	Type(Opcode, ClassName),
	Field(Opcode, FieldRef),
	/// The bool is `true` for interface methods of `INVOKESTATIC` and `INVOKESPECIAL`.
	Method(Opcode, MethodRef, bool),
	Jump(Opcode, String),
	Ldc(Constant),
	MultiANewArray(ClassName, u8),
	TableSwitch {
		low: i32,
		high: i32,
		labels: Vec<String>,
		default: String,
	},
	LookupSwitch {
		pairs: Vec<(i32, String)>,
		default: String,
	},
	InvokeDynamic {
		name: MethodName,
		descriptor: MethodDescriptor,
		handle: Handle,
		arguments: Vec<Constant>,
	},
}

impl InstructionNode {
	pub fn opcode(&self) -> Opcode {
		match self {
			InstructionNode::Simple(opcode) |
			InstructionNode::Int(opcode, _) |
			InstructionNode::Variable(opcode, _) |
			InstructionNode::Type(opcode, _) |
			InstructionNode::Field(opcode, _) |
			InstructionNode::Method(opcode, _, _) |
			InstructionNode::Jump(opcode, _) => *opcode,
			InstructionNode::NewArray(_) => Opcode::NewArray,
			InstructionNode::Increment(..) => Opcode::IInc,
			InstructionNode::Ldc(_) => Opcode::Ldc,
			InstructionNode::MultiANewArray(..) => Opcode::MultiANewArray,
			InstructionNode::TableSwitch { .. } => Opcode::TableSwitch,
			InstructionNode::LookupSwitch { .. } => Opcode::LookupSwitch,
			InstructionNode::InvokeDynamic { .. } => Opcode::InvokeDynamic,
		}
	}

	/// Returns all the label names this instruction refers to.
	pub fn label_references(&self) -> Vec<&str> {
		match self {
			InstructionNode::Jump(_, label) => vec![label],
			InstructionNode::TableSwitch { labels, default, .. } =>
				labels.iter().chain(std::iter::once(default)).map(String::as_str).collect(),
			InstructionNode::LookupSwitch { pairs, default } =>
				pairs.iter().map(|(_, label)| label).chain(std::iter::once(default)).map(String::as_str).collect(),
			_ => Vec::new(),
		}
	}
}

impl Print for InstructionNode {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mnemonic = context.mnemonic(self.opcode().mnemonic());
		let operands = match self {
			InstructionNode::Simple(_) => return mnemonic,
			InstructionNode::Int(_, value) => context.literal(&value.to_string()),
			InstructionNode::NewArray(array_type) => context.literal(&array_type.descriptor_char().to_string()),
			InstructionNode::Variable(_, variable) => context.name(&variable.name),
			InstructionNode::Increment(variable, amount) =>
				format!("{} {}", context.name(&variable.name), context.literal(&amount.to_string())),
			InstructionNode::Type(_, class) => context.name(class.as_inner()),
			InstructionNode::Field(_, field) => format!("{} {}",
				context.name(&format!("{}.{}", field.class.as_inner(), field.name.as_inner())),
				context.name(field.desc.as_inner()),
			),
			InstructionNode::Method(_, method, itf) => format!("{}{}",
				context.name(&format!("{}.{}{}", method.class.as_inner(), method.name.as_inner(), method.desc.as_inner())),
				if *itf { format!(" {}", context.keyword("itf")) } else { String::new() },
			),
			InstructionNode::Jump(_, label) => context.name(label),
			InstructionNode::Ldc(constant) => constant.print(context),
			InstructionNode::MultiANewArray(class, dimensions) =>
				format!("{} {}", context.name(class.as_inner()), context.literal(&dimensions.to_string())),
			InstructionNode::TableSwitch { low, high, labels, default } => {
				let labels: Vec<_> = labels.iter().map(|x| context.name(x)).collect();
				format!("{}[{}:{}] {}[{}] {}[{}]",
					context.keyword("range"), context.literal(&low.to_string()), context.literal(&high.to_string()),
					context.keyword("labels"), labels.join(", "),
					context.keyword("default"), context.name(default),
				)
			},
			InstructionNode::LookupSwitch { pairs, default } => {
				let pairs: Vec<_> = pairs.iter()
					.map(|(key, label)| format!("{}={}", context.literal(&key.to_string()), context.name(label)))
					.collect();
				format!("{}[{}] {}[{}]",
					context.keyword("mapping"), pairs.join(", "),
					context.keyword("default"), context.name(default),
				)
			},
			InstructionNode::InvokeDynamic { name, descriptor, handle, arguments } => {
				let arguments: Vec<_> = arguments.iter().map(|x| x.print(context)).collect();
				format!("{} {} {} {}[{}]",
					context.name(name.as_inner()),
					context.name(descriptor.as_inner()),
					print_handle(handle, context),
					context.keyword("args"), arguments.join(", "),
				)
			},
		};
		format!("{mnemonic} {operands}")
	}
}

/// A `try <start> <end> catch(<type>) <handler>` range.
///
/// A `catch(*)` catches everything, and is stored as a `catch_type` of [`None`].
#[derive(Debug, Clone, PartialEq)]
pub struct TryCatch {
	pub start: String,
	pub end: String,
	pub handler: String,
	pub catch_type: Option<ClassName>,
}

impl Print for TryCatch {
	fn print(&self, context: &dyn PrintContext) -> String {
		let catch_type = self.catch_type.as_ref().map_or("*", |x| x.as_inner());
		format!("{} {} {} {}({}) {}",
			context.keyword("try"),
			context.name(&self.start),
			context.name(&self.end),
			context.keyword("catch"),
			context.name(catch_type),
			context.name(&self.handler),
		)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrownException(pub ClassName);

impl Print for ThrownException {
	fn print(&self, context: &dyn PrintContext) -> String {
		format!("{} {}", context.keyword("throws"), context.name(self.0.as_inner()))
	}
}

/// One line of a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
	Label(String),
	/// A line number, starting at a label.
	Line(String, u16),
	Instruction(InstructionNode),
	TryCatch(TryCatch),
	Throws(ThrownException),
}

impl Print for Statement {
	fn print(&self, context: &dyn PrintContext) -> String {
		match self {
			Statement::Label(name) => format!("{} {}", context.mnemonic("LABEL"), context.name(name)),
			Statement::Line(label, line) =>
				format!("{} {} {}", context.mnemonic("LINE"), context.name(label), context.literal(&line.to_string())),
			Statement::Instruction(instruction) => instruction.print(context),
			Statement::TryCatch(try_catch) => try_catch.print(context),
			Statement::Throws(thrown) => thrown.print(context),
		}
	}
}

/// A method body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Code {
	pub statements: Vec<Statement>,
}

impl Print for Code {
	fn print(&self, context: &dyn PrintContext) -> String {
		self.statements.iter()
			.map(|statement| statement.print(context))
			.collect::<Vec<_>>()
			.join("\n")
	}
}
