//! Turning parsed statements into the instruction list of a method, once all names are known.

use duke::tree::class::ClassName;
use duke::tree::method::code::{Exception, Instruction, InstructionListEntry, InvokeDynamic, Label, Loadable, LvIndex};
use crate::assembler::labels::LabelTable;
use crate::assembler::variables::VariableTable;
use crate::ast::code::{Constant, InstructionNode, Statement, TryCatch};
use crate::error::{LineError, LineErrorKind, ResolveError};
use crate::opcode::Opcode;
use crate::text::unescape;

/// The resolved body of a method.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Resolved {
	pub(crate) instructions: Vec<InstructionListEntry>,
	/// The source line of each entry of `instructions`.
	pub(crate) line_index: Vec<Option<u32>>,
	pub(crate) exception_table: Vec<Exception>,
	pub(crate) exceptions: Vec<ClassName>,
}

struct Resolver<'a> {
	labels: &'a LabelTable,
	variables: &'a VariableTable,
}

/// Resolves all statements, collecting the errors of every statement that fails.
pub(crate) fn resolve(statements: &[(u32, Statement)], labels: &LabelTable, variables: &VariableTable) -> Result<Resolved, Vec<LineError>> {
	let resolver = Resolver { labels, variables };
	let mut resolved = Resolved::default();
	let mut errors = Vec::new();

	for (line, statement) in statements {
		let result = match statement {
			Statement::Label(name) => resolver.label(name).map(|label| Some(InstructionListEntry::Label(label))),
			Statement::Line(name, number) => resolver.label(name)
				.map(|start| Some(InstructionListEntry::LineNumber { line: *number, start })),
			Statement::Instruction(instruction) => resolver.instruction(instruction)
				.map(|instruction| Some(InstructionListEntry::Instruction(instruction))),
			Statement::TryCatch(try_catch) => resolver.try_catch(try_catch).map(|exception| {
				resolved.exception_table.push(exception);
				None
			}),
			Statement::Throws(thrown) => {
				resolved.exceptions.push(thrown.0.clone());
				Ok(None)
			},
		};

		match result {
			Ok(Some(entry)) => {
				resolved.instructions.push(entry);
				resolved.line_index.push(Some(*line));
			},
			Ok(None) => {},
			Err(kind) => errors.push(LineError::new(*line, kind)),
		}
	}

	if errors.is_empty() {
		Ok(resolved)
	} else {
		Err(errors)
	}
}

impl Resolver<'_> {
	fn label(&self, name: &str) -> Result<Label, LineErrorKind> {
		Ok(self.labels.resolve(name)?)
	}

	fn variable(&self, name: &str) -> Result<LvIndex, LineErrorKind> {
		Ok(LvIndex { index: self.variables.get(name)? })
	}

	fn try_catch(&self, try_catch: &TryCatch) -> Result<Exception, LineErrorKind> {
		Ok(Exception {
			start: self.label(&try_catch.start)?,
			end: self.label(&try_catch.end)?,
			handler: self.label(&try_catch.handler)?,
			catch: try_catch.catch_type.clone(),
		})
	}

	fn instruction(&self, node: &InstructionNode) -> Result<Instruction, LineErrorKind> {
		let opcode = node.opcode();
		let out_of_range = |value: i64| ResolveError::OperandOutOfRange { mnemonic: opcode.mnemonic(), value };

		let instruction = match node {
			InstructionNode::Simple(opcode) => opcode.to_simple(),
			InstructionNode::Int(Opcode::BiPush, value) => Some(Instruction::BiPush(
				i8::try_from(*value).map_err(|_| out_of_range(i64::from(*value)))?
			)),
			InstructionNode::Int(Opcode::SiPush, value) => Some(Instruction::SiPush(
				i16::try_from(*value).map_err(|_| out_of_range(i64::from(*value)))?
			)),
			InstructionNode::Int(..) => None,
			InstructionNode::NewArray(array_type) => Some(Instruction::NewArray(*array_type)),
			InstructionNode::Variable(opcode, variable) => opcode.to_variable(self.variable(&variable.name)?),
			InstructionNode::Increment(variable, amount) => Some(Instruction::IInc(self.variable(&variable.name)?, *amount)),
			InstructionNode::Type(opcode, class) => opcode.to_type(class.clone()),
			InstructionNode::Field(opcode, field) => opcode.to_field(field.clone()),
			InstructionNode::Method(opcode, method, itf) => match opcode {
				Opcode::InvokeVirtual => Some(Instruction::InvokeVirtual(method.clone())),
				Opcode::InvokeSpecial => Some(Instruction::InvokeSpecial(method.clone(), *itf)),
				Opcode::InvokeStatic => Some(Instruction::InvokeStatic(method.clone(), *itf)),
				Opcode::InvokeInterface => Some(Instruction::InvokeInterface(method.clone())),
				_ => None,
			},
			InstructionNode::Jump(opcode, label) => opcode.to_jump(self.label(label)?),
			InstructionNode::Ldc(constant) => Some(Instruction::Ldc(loadable(constant)?)),
			InstructionNode::MultiANewArray(class, dimensions) => Some(Instruction::MultiANewArray(class.clone(), *dimensions)),
			InstructionNode::TableSwitch { low, high, labels, default } => Some(Instruction::TableSwitch {
				default: self.label(default)?,
				low: *low,
				high: *high,
				table: labels.iter()
					.map(|label| self.label(label))
					.collect::<Result<_, _>>()?,
			}),
			InstructionNode::LookupSwitch { pairs, default } => {
				let mut pairs = pairs.iter()
					.map(|(key, label)| Ok((*key, self.label(label)?)))
					.collect::<Result<Vec<_>, LineErrorKind>>()?;
				pairs.sort_by_key(|(key, _)| *key);
				Some(Instruction::LookupSwitch { default: self.label(default)?, pairs })
			},
			InstructionNode::InvokeDynamic { name, descriptor, handle, arguments } => Some(Instruction::InvokeDynamic(InvokeDynamic {
				name: name.clone(),
				descriptor: descriptor.clone(),
				handle: handle.clone(),
				arguments: arguments.iter()
					.map(loadable)
					.collect::<Result<_, _>>()?,
			})),
		};

		instruction.ok_or_else(|| LineErrorKind::MissingAssembler(opcode.mnemonic().to_owned()))
	}
}

fn loadable(constant: &Constant) -> Result<Loadable, ResolveError> {
	Ok(match constant {
		Constant::Int(x) => Loadable::Integer(*x),
		Constant::Long(x) => Loadable::Long(*x),
		Constant::Float(x) => Loadable::Float(*x),
		Constant::Double(x) => Loadable::Double(*x),
		Constant::String(text) => Loadable::String(unescape(text)
			.map_err(|detail| ResolveError::InvalidString { text: text.clone(), detail })?),
		Constant::Class(class) => Loadable::Class(class.clone()),
		Constant::MethodType(desc) => Loadable::MethodType(desc.clone()),
		Constant::Handle(handle) => Loadable::MethodHandle(handle.clone()),
		Constant::Unsupported(description) => return Err(ResolveError::UnsupportedConstant(description.clone())),
	})
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::tree::method::code::{Instruction, InstructionListEntry, Loadable, LvIndex};
	use crate::assembler::labels::LabelTable;
	use crate::assembler::resolve::resolve;
	use crate::assembler::variables::{Category, VariableTable};
	use crate::ast::code::{Constant, InstructionNode, Statement, VariableRef};
	use crate::error::{LabelError, LineError, LineErrorKind, ResolveError};
	use crate::opcode::{Opcode, VariableOperation};

	#[test]
	fn unresolved_names_are_collected() {
		let mut labels = LabelTable::new();
		labels.register("nowhere").unwrap();
		let mut variables = VariableTable::new();
		variables.setup(true, [("x", Category::Int)]).unwrap();

		let statements = vec![
			(1, Statement::Instruction(InstructionNode::Jump(Opcode::Goto, "nowhere".to_owned()))),
			(2, Statement::Instruction(InstructionNode::Variable(Opcode::ILoad, VariableRef::new("x", VariableOperation::Read)))),
			(3, Statement::Instruction(InstructionNode::Ldc(Constant::String("\\q".to_owned())))),
			(4, Statement::Instruction(InstructionNode::Int(Opcode::BiPush, 300))),
		];
		let errors = resolve(&statements, &labels, &variables).unwrap_err();
		assert_eq!(errors.len(), 3);
		assert_eq!(errors[0], LineError::new(1, LabelError::Unresolved("nowhere".to_owned())));
		assert_eq!(errors[1].line, Some(3));
		assert!(matches!(errors[1].kind, LineErrorKind::Resolve(ResolveError::InvalidString { .. })));
		assert_eq!(errors[2], LineError::new(4, ResolveError::OperandOutOfRange { mnemonic: "BIPUSH", value: 300 }));
	}

	#[test]
	fn entries_and_lines() {
		let mut labels = LabelTable::new();
		let a = labels.declare("A").unwrap();
		let b = labels.declare("B").unwrap();
		let mut variables = VariableTable::new();
		variables.setup(false, []).unwrap();

		let statements = vec![
			(2, Statement::Label("A".to_owned())),
			(3, Statement::Instruction(InstructionNode::LookupSwitch {
				pairs: vec![(9, "A".to_owned()), (-3, "B".to_owned())],
				default: "A".to_owned(),
			})),
			(5, Statement::Label("B".to_owned())),
			(6, Statement::Instruction(InstructionNode::Ldc(Constant::String("a\\nb".to_owned())))),
			(7, Statement::Instruction(InstructionNode::Variable(Opcode::ALoad, VariableRef::new("this", VariableOperation::Read)))),
		];
		let resolved = resolve(&statements, &labels, &variables).unwrap();
		assert_eq!(resolved.instructions, vec![
			InstructionListEntry::Label(a),
			InstructionListEntry::Instruction(Instruction::LookupSwitch { default: a, pairs: vec![(-3, b), (9, a)] }),
			InstructionListEntry::Label(b),
			InstructionListEntry::Instruction(Instruction::Ldc(Loadable::String("a\nb".to_owned()))),
			InstructionListEntry::Instruction(Instruction::ALoad(LvIndex { index: 0 })),
		]);
		assert_eq!(resolved.line_index, vec![Some(2), Some(3), Some(5), Some(6), Some(7)]);
	}
}
