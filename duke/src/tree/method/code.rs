use anyhow::bail;
use crate::macros::{make_display, make_string_str_like};
use crate::tree::class::ClassName;
use crate::tree::field::{FieldDescriptor, FieldName, FieldRef, FieldSignature};
use crate::tree::method::{MethodDescriptor, MethodName, MethodRef};

/// One entry of the instruction list of some [`Code`].
///
/// Labels and line numbers are part of the list, at the position they mark. An entry
/// [`InstructionListEntry::Label`] marks the bytecode offset of the next [`InstructionListEntry::Instruction`] (or the
/// end of the code if there's none).
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionListEntry {
	Label(Label),
	/// Starts the source line `line` at the position of the label `start`.
	LineNumber {
		line: u16,
		start: Label,
	},
	Instruction(Instruction),
}

impl InstructionListEntry {
	pub fn as_instruction(&self) -> Option<&Instruction> {
		match self {
			InstructionListEntry::Instruction(instruction) => Some(instruction),
			_ => None,
		}
	}
}

impl From<Instruction> for InstructionListEntry {
	fn from(value: Instruction) -> Self {
		InstructionListEntry::Instruction(value)
	}
}

/// Represents the code of a method.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Code {
	pub max_stack: Option<u16>,
	pub max_locals: Option<u16>,

	pub instructions: Vec<InstructionListEntry>,
	pub exception_table: Vec<Exception>,

	pub local_variables: Option<Vec<Lv>>,
}

impl Code {
	/// Returns the real instructions, skipping labels and line numbers.
	pub fn real_instructions(&self) -> impl Iterator<Item=&Instruction> {
		self.instructions.iter().filter_map(InstructionListEntry::as_instruction)
	}
}

make_string_str_like!(
	pub LocalVariableName(String);
	pub LocalVariableNameSlice(str);
	is_valid(s) = if crate::tree::names::is_valid_unqualified_name(s) {
		Ok(())
	} else {
		bail!("invalid local variable name: must be non-empty and not contain any of `.`, `;`, `[` and `/`")
	};
);
make_display!(LocalVariableName, LocalVariableNameSlice);

/// An entry of the exception table.
///
/// A `catch` of [`None`] catches everything, as used for `finally` blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
	pub start: Label,
	pub end: Label,
	pub handler: Label,
	pub catch: Option<ClassName>,
}

/// Represents an index of a local variable.
///
/// If the local variable is of type `double` or `long`, it also occupies
/// the [`LvIndex`] with `index = index + 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LvIndex {
	pub index: u16,
}

/// An entry of the local variable table, merged with the matching local variable type table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Lv {
	pub range: LabelRange,
	pub name: LocalVariableName,
	pub descriptor: Option<FieldDescriptor>,
	pub signature: Option<FieldSignature>,
	pub index: LvIndex,
}

/// Represents a bytecode offset of an opcode using a method-local id.
///
/// The id does **not** correspond to the bytecode offset in any direct way. When reading or writing,
/// that id is used to uniquely identify a bytecode offset. Two labels are the same label exactly if
/// their ids are equal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label {
	id: u16,
}

impl Label {
	pub const fn new(id: u16) -> Label {
		Label { id }
	}

	pub fn id(self) -> u16 {
		self.id
	}
}

/// Represents a range of bytecode offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRange {
	/// The start label, inclusive.
	pub start: Label,
	/// The end label, exclusive.
	pub end: Label,
}

/// Represents an instruction of the JVM.
///
/// Each instruction can either:
/// - hold no additional data, like [`Instruction::Nop`],
/// - hold some immediate value, like [`Instruction::BiPush`],
/// - hold a [local variable index][LvIndex], like [`Instruction::ILoad`] (note that this also represents the `iload_0` instruction for example),
/// - hold a [`Label`] for jumps, like [`Instruction::IfEq`],
/// - or hold other data the instruction needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
	Nop,
	AConstNull,
	IConstM1, IConst0, IConst1, IConst2, IConst3, IConst4, IConst5,
	LConst0, LConst1,
	FConst0, FConst1, FConst2,
	DConst0, DConst1,
	BiPush(i8),
	SiPush(i16),
	Ldc(Loadable),
	ILoad(LvIndex), LLoad(LvIndex), FLoad(LvIndex), DLoad(LvIndex), ALoad(LvIndex),
	IALoad, LALoad, FALoad, DALoad, AALoad, BALoad, CALoad, SALoad,
	IStore(LvIndex), LStore(LvIndex), FStore(LvIndex), DStore(LvIndex), AStore(LvIndex),
	IAStore, LAStore, FAStore, DAStore, AAStore, BAStore, CAStore, SAStore,
	Pop, Pop2,
	Dup, DupX1, DupX2,
	Dup2, Dup2X1, Dup2X2,
	Swap,
	IAdd, LAdd, FAdd, DAdd,
	ISub, LSub, FSub, DSub,
	IMul, LMul, FMul, DMul,
	IDiv, LDiv, FDiv, DDiv,
	IRem, LRem, FRem, DRem,
	INeg, LNeg, FNeg, DNeg,
	IShl, LShl,
	IShr, LShr,
	IUShr, LUShr,
	IAnd, LAnd,
	IOr, LOr,
	IXor, LXor,
	IInc(LvIndex, i16),
	I2L, I2F, I2D,
	L2I, L2F, L2D,
	F2I, F2L, F2D,
	D2I, D2L, D2F,
	I2B, I2C, I2S,
	LCmp,
	FCmpL, FCmpG,
	DCmpL, DCmpG,
	IfEq(Label), IfNe(Label), IfLt(Label), IfGe(Label), IfGt(Label), IfLe(Label),
	IfICmpEq(Label), IfICmpNe(Label), IfICmpLt(Label), IfICmpGe(Label), IfICmpGt(Label), IfICmpLe(Label),
	IfACmpEq(Label), IfACmpNe(Label),
	Goto(Label),
	Jsr(Label),
	Ret(LvIndex),
	TableSwitch {
		default: Label,
		low: i32,
		high: i32,
		table: Vec<Label>,
	},
	LookupSwitch {
		default: Label,
		/// Note that these must be ordered.
		pairs: Vec<(i32, Label)>
	},
	IReturn, LReturn, FReturn, DReturn, AReturn,
	Return,
	GetStatic(FieldRef),
	PutStatic(FieldRef),
	GetField(FieldRef),
	PutField(FieldRef),
	InvokeVirtual(MethodRef),
	/// The bool is `true` iff it's on an interface, so if it referenced an `InterfaceMethodRef` constant pool entry.
	InvokeSpecial(MethodRef, bool),
	/// The bool is `true` iff it's on an interface, so if it referenced an `InterfaceMethodRef` constant pool entry.
	InvokeStatic(MethodRef, bool),
	/// `invokeinterface` always uses an `InterfaceMethodRef` constant pool entry.
	InvokeInterface(MethodRef),
	InvokeDynamic(InvokeDynamic),
	New(ClassName),
	NewArray(ArrayType),
	ANewArray(ClassName),
	ArrayLength,
	AThrow,
	CheckCast(ClassName),
	InstanceOf(ClassName),
	MonitorEnter, MonitorExit,
	MultiANewArray(ClassName, u8),
	IfNull(Label), IfNonNull(Label),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable {
	Integer(i32),
	Float(f32),
	Long(i64),
	Double(f64),
	Class(ClassName),
	String(String),
	MethodHandle(Handle),
	MethodType(MethodDescriptor),
	Dynamic(ConstantDynamic),
}

/// A method handle constant.
///
/// The bool of [`Handle::InvokeStatic`] and [`Handle::InvokeSpecial`] is `true` iff the handle refers to an
/// interface method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Handle {
	GetField(FieldRef),
	GetStatic(FieldRef),
	PutField(FieldRef),
	PutStatic(FieldRef),
	InvokeVirtual(MethodRef),
	InvokeStatic(MethodRef, bool),
	InvokeSpecial(MethodRef, bool),
	NewInvokeSpecial(MethodRef),
	InvokeInterface(MethodRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDynamic {
	pub name: FieldName,
	pub descriptor: FieldDescriptor,
	pub handle: Handle,
	pub arguments: Vec<Loadable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeDynamic {
	pub name: MethodName,
	pub descriptor: MethodDescriptor,
	pub handle: Handle,
	pub arguments: Vec<Loadable>,
}

/// The element type of the `newarray` instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArrayType {
	Boolean,
	Char,
	Float,
	Double,
	Byte,
	Short,
	Int,
	Long,
}

impl ArrayType {
	/// Gets the array type from the descriptor of its element type.
	///
	/// ```
	/// use duke::tree::method::code::ArrayType;
	/// assert_eq!(ArrayType::from_descriptor_char('Z'), Some(ArrayType::Boolean));
	/// assert_eq!(ArrayType::from_descriptor_char('V'), None);
	/// ```
	pub fn from_descriptor_char(c: char) -> Option<ArrayType> {
		match c {
			'Z' => Some(ArrayType::Boolean),
			'C' => Some(ArrayType::Char),
			'F' => Some(ArrayType::Float),
			'D' => Some(ArrayType::Double),
			'B' => Some(ArrayType::Byte),
			'S' => Some(ArrayType::Short),
			'I' => Some(ArrayType::Int),
			'J' => Some(ArrayType::Long),
			_ => None,
		}
	}

	pub fn descriptor_char(self) -> char {
		match self {
			ArrayType::Boolean => 'Z',
			ArrayType::Char    => 'C',
			ArrayType::Float   => 'F',
			ArrayType::Double  => 'D',
			ArrayType::Byte    => 'B',
			ArrayType::Short   => 'S',
			ArrayType::Int     => 'I',
			ArrayType::Long    => 'J',
		}
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::tree::method::code::{ArrayType, Code, Instruction, InstructionListEntry, Label};

	#[test]
	fn array_type_chars() {
		for c in ['Z', 'C', 'F', 'D', 'B', 'S', 'I', 'J'] {
			assert_eq!(ArrayType::from_descriptor_char(c).map(ArrayType::descriptor_char), Some(c));
		}
	}

	#[test]
	fn real_instructions_skip_labels() {
		let code = Code {
			instructions: vec![
				InstructionListEntry::Label(Label::new(0)),
				InstructionListEntry::LineNumber { line: 3, start: Label::new(0) },
				Instruction::Nop.into(),
				Instruction::Return.into(),
			],
			..Code::default()
		};
		assert_eq!(code.real_instructions().collect::<Vec<_>>(), vec![&Instruction::Nop, &Instruction::Return]);
	}
}
