//! The emission pass: one statement per entry of the instruction list.

use std::collections::HashMap;
use duke::tree::method::code::{Code, Instruction, InstructionListEntry, Label, Loadable};
use crate::ast::code::{Constant, InstructionNode, Statement, TryCatch, VariableRef};
use crate::disassembler::naming::VariableNames;
use crate::opcode::{Opcode, VariableOperation};
use crate::text::escape;

pub(crate) struct Emitter<'a> {
	pub(crate) labels: &'a HashMap<Label, String>,
	pub(crate) variables: &'a VariableNames,
}

impl Emitter<'_> {
	fn label(&self, label: &Label) -> String {
		self.labels.get(label)
			.cloned()
			.unwrap_or_else(|| format!("L{}", label.id()))
	}

	fn variable(&self, opcode: Opcode, slot: u16) -> VariableRef {
		VariableRef::new(self.variables.get(slot), opcode.variable_operation().unwrap_or(VariableOperation::Read))
	}

	/// The statements of some code: first the try/catch ranges, then the instruction list.
	pub(crate) fn code(&self, code: &Code) -> Vec<Statement> {
		let try_catches = code.exception_table.iter().map(|exception| Statement::TryCatch(TryCatch {
			start: self.label(&exception.start),
			end: self.label(&exception.end),
			handler: self.label(&exception.handler),
			catch_type: exception.catch.clone(),
		}));
		let entries = code.instructions.iter().map(|entry| match entry {
			InstructionListEntry::Label(label) => Statement::Label(self.label(label)),
			InstructionListEntry::LineNumber { line, start } => Statement::Line(self.label(start), *line),
			InstructionListEntry::Instruction(instruction) => Statement::Instruction(self.instruction(instruction)),
		});
		try_catches.chain(entries).collect()
	}

	pub(crate) fn instruction(&self, instruction: &Instruction) -> InstructionNode {
		let opcode = Opcode::of(instruction);
		match instruction {
			Instruction::BiPush(value) => InstructionNode::Int(opcode, i32::from(*value)),
			Instruction::SiPush(value) => InstructionNode::Int(opcode, i32::from(*value)),
			Instruction::Ldc(loadable) => InstructionNode::Ldc(constant(loadable)),
			Instruction::ILoad(lv) | Instruction::LLoad(lv) | Instruction::FLoad(lv) | Instruction::DLoad(lv) |
			Instruction::ALoad(lv) | Instruction::IStore(lv) | Instruction::LStore(lv) | Instruction::FStore(lv) |
			Instruction::DStore(lv) | Instruction::AStore(lv) | Instruction::Ret(lv) =>
				InstructionNode::Variable(opcode, self.variable(opcode, lv.index)),
			Instruction::IInc(lv, amount) => InstructionNode::Increment(self.variable(opcode, lv.index), *amount),
			Instruction::IfEq(label) | Instruction::IfNe(label) | Instruction::IfLt(label) |
			Instruction::IfGe(label) | Instruction::IfGt(label) | Instruction::IfLe(label) |
			Instruction::IfICmpEq(label) | Instruction::IfICmpNe(label) | Instruction::IfICmpLt(label) |
			Instruction::IfICmpGe(label) | Instruction::IfICmpGt(label) | Instruction::IfICmpLe(label) |
			Instruction::IfACmpEq(label) | Instruction::IfACmpNe(label) |
			Instruction::Goto(label) | Instruction::Jsr(label) |
			Instruction::IfNull(label) | Instruction::IfNonNull(label) => InstructionNode::Jump(opcode, self.label(label)),
			Instruction::TableSwitch { default, low, high, table } => InstructionNode::TableSwitch {
				low: *low,
				high: *high,
				labels: table.iter().map(|label| self.label(label)).collect(),
				default: self.label(default),
			},
			Instruction::LookupSwitch { default, pairs } => InstructionNode::LookupSwitch {
				pairs: pairs.iter().map(|(key, label)| (*key, self.label(label))).collect(),
				default: self.label(default),
			},
			Instruction::New(class) | Instruction::ANewArray(class) |
			Instruction::CheckCast(class) | Instruction::InstanceOf(class) => InstructionNode::Type(opcode, class.clone()),
			Instruction::GetStatic(field) | Instruction::PutStatic(field) |
			Instruction::GetField(field) | Instruction::PutField(field) => InstructionNode::Field(opcode, field.clone()),
			Instruction::InvokeVirtual(method) | Instruction::InvokeInterface(method) =>
				InstructionNode::Method(opcode, method.clone(), false),
			Instruction::InvokeSpecial(method, itf) | Instruction::InvokeStatic(method, itf) =>
				InstructionNode::Method(opcode, method.clone(), *itf),
			Instruction::InvokeDynamic(invoke_dynamic) => InstructionNode::InvokeDynamic {
				name: invoke_dynamic.name.clone(),
				descriptor: invoke_dynamic.descriptor.clone(),
				handle: invoke_dynamic.handle.clone(),
				arguments: invoke_dynamic.arguments.iter().map(constant).collect(),
			},
			Instruction::NewArray(array_type) => InstructionNode::NewArray(*array_type),
			Instruction::MultiANewArray(class, dimensions) => InstructionNode::MultiANewArray(class.clone(), *dimensions),
			_ => InstructionNode::Simple(opcode),
		}
	}
}

/// Dynamic constants have no text form, and are kept as [`Constant::Unsupported`].
pub(crate) fn constant(loadable: &Loadable) -> Constant {
	match loadable {
		Loadable::Integer(x) => Constant::Int(*x),
		Loadable::Float(x) => Constant::Float(*x),
		Loadable::Long(x) => Constant::Long(*x),
		Loadable::Double(x) => Constant::Double(*x),
		Loadable::Class(class) => Constant::Class(class.clone()),
		Loadable::String(s) => Constant::String(escape(s)),
		Loadable::MethodHandle(handle) => Constant::Handle(handle.clone()),
		Loadable::MethodType(desc) => Constant::MethodType(desc.clone()),
		Loadable::Dynamic(dynamic) => Constant::Unsupported(format!("dynamic {} {}", dynamic.name.as_inner(), dynamic.descriptor.as_inner())),
	}
}

#[cfg(test)]
mod testing {
	use std::collections::HashMap;
	use pretty_assertions::assert_eq;
	use duke::tree::method::code::{ConstantDynamic, Handle, Instruction, Loadable, LvIndex};
	use duke::tree::method::MethodRef;
	use crate::ast::code::Constant;
	use crate::ast::Print;
	use crate::disassembler::emit::{constant, Emitter};
	use crate::disassembler::naming::VariableNames;

	#[test]
	fn constants() {
		assert_eq!(constant(&Loadable::String("a\"b\n".to_owned())), Constant::String("a\\\"b\\n".to_owned()));
		assert_eq!(constant(&Loadable::Long(-4)).print_plain(), "-4L");

		let handle = Handle::InvokeStatic(MethodRef {
			class: "a/B".parse().unwrap(),
			name: "bootstrap".parse().unwrap(),
			desc: "()V".parse().unwrap(),
		}, false);
		let dynamic = Loadable::Dynamic(ConstantDynamic {
			name: "value".parse().unwrap(),
			descriptor: "I".parse().unwrap(),
			handle,
			arguments: Vec::new(),
		});
		assert_eq!(constant(&dynamic).print_plain(), "unsupported[dynamic value I]");
	}

	#[test]
	fn unnamed_operands() {
		let labels = HashMap::new();
		let variables = VariableNames::default();
		let emitter = Emitter { labels: &labels, variables: &variables };
		assert_eq!(emitter.instruction(&Instruction::IInc(LvIndex { index: 3 }, 7)).print_plain(), "IINC 3 7");
		assert_eq!(emitter.instruction(&Instruction::BiPush(-8)).print_plain(), "BIPUSH -8");
		assert_eq!(emitter.instruction(&Instruction::DupX2).print_plain(), "DUP_X2");
	}
}
