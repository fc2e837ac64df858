//! The mnemonic table, and the mapping between [`Opcode`]s and [`Instruction`]s.

use duke::tree::class::ClassName;
use duke::tree::field::FieldRef;
use duke::tree::method::code::{Instruction, Label, LvIndex};
use crate::assembler::variables::Category;

/// The operand shape of an instruction, selecting the parser used for it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Family {
	Simple,
	Int,
	NewArray,
	Variable,
	Increment,
	Type,
	Field,
	Method,
	Jump,
	Ldc,
	MultiANewArray,
	TableSwitch,
	LookupSwitch,
	InvokeDynamic,
}

macro_rules! opcodes {
	( $( $variant:ident = $mnemonic:literal : $family:ident , )* ) => {
		/// An instruction without its operands.
		///
		/// The variants are named like the ones of [`Instruction`].
		#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
		pub enum Opcode {
			$( $variant, )*
		}

		impl Opcode {
			pub const ALL: &'static [Opcode] = &[ $( Opcode::$variant, )* ];

			/// The upper case mnemonic.
			pub fn mnemonic(self) -> &'static str {
				match self {
					$( Opcode::$variant => $mnemonic, )*
				}
			}

			pub fn family(self) -> Family {
				match self {
					$( Opcode::$variant => Family::$family, )*
				}
			}
		}
	}
}

opcodes! {
	Nop = "NOP": Simple,
	AConstNull = "ACONST_NULL": Simple,
	IConstM1 = "ICONST_M1": Simple,
	IConst0 = "ICONST_0": Simple,
	IConst1 = "ICONST_1": Simple,
	IConst2 = "ICONST_2": Simple,
	IConst3 = "ICONST_3": Simple,
	IConst4 = "ICONST_4": Simple,
	IConst5 = "ICONST_5": Simple,
	LConst0 = "LCONST_0": Simple,
	LConst1 = "LCONST_1": Simple,
	FConst0 = "FCONST_0": Simple,
	FConst1 = "FCONST_1": Simple,
	FConst2 = "FCONST_2": Simple,
	DConst0 = "DCONST_0": Simple,
	DConst1 = "DCONST_1": Simple,
	BiPush = "BIPUSH": Int,
	SiPush = "SIPUSH": Int,
	Ldc = "LDC": Ldc,
	ILoad = "ILOAD": Variable,
	LLoad = "LLOAD": Variable,
	FLoad = "FLOAD": Variable,
	DLoad = "DLOAD": Variable,
	ALoad = "ALOAD": Variable,
	IALoad = "IALOAD": Simple,
	LALoad = "LALOAD": Simple,
	FALoad = "FALOAD": Simple,
	DALoad = "DALOAD": Simple,
	AALoad = "AALOAD": Simple,
	BALoad = "BALOAD": Simple,
	CALoad = "CALOAD": Simple,
	SALoad = "SALOAD": Simple,
	IStore = "ISTORE": Variable,
	LStore = "LSTORE": Variable,
	FStore = "FSTORE": Variable,
	DStore = "DSTORE": Variable,
	AStore = "ASTORE": Variable,
	IAStore = "IASTORE": Simple,
	LAStore = "LASTORE": Simple,
	FAStore = "FASTORE": Simple,
	DAStore = "DASTORE": Simple,
	AAStore = "AASTORE": Simple,
	BAStore = "BASTORE": Simple,
	CAStore = "CASTORE": Simple,
	SAStore = "SASTORE": Simple,
	Pop = "POP": Simple,
	Pop2 = "POP2": Simple,
	Dup = "DUP": Simple,
	DupX1 = "DUP_X1": Simple,
	DupX2 = "DUP_X2": Simple,
	Dup2 = "DUP2": Simple,
	Dup2X1 = "DUP2_X1": Simple,
	Dup2X2 = "DUP2_X2": Simple,
	Swap = "SWAP": Simple,
	IAdd = "IADD": Simple,
	LAdd = "LADD": Simple,
	FAdd = "FADD": Simple,
	DAdd = "DADD": Simple,
	ISub = "ISUB": Simple,
	LSub = "LSUB": Simple,
	FSub = "FSUB": Simple,
	DSub = "DSUB": Simple,
	IMul = "IMUL": Simple,
	LMul = "LMUL": Simple,
	FMul = "FMUL": Simple,
	DMul = "DMUL": Simple,
	IDiv = "IDIV": Simple,
	LDiv = "LDIV": Simple,
	FDiv = "FDIV": Simple,
	DDiv = "DDIV": Simple,
	IRem = "IREM": Simple,
	LRem = "LREM": Simple,
	FRem = "FREM": Simple,
	DRem = "DREM": Simple,
	INeg = "INEG": Simple,
	LNeg = "LNEG": Simple,
	FNeg = "FNEG": Simple,
	DNeg = "DNEG": Simple,
	IShl = "ISHL": Simple,
	LShl = "LSHL": Simple,
	IShr = "ISHR": Simple,
	LShr = "LSHR": Simple,
	IUShr = "IUSHR": Simple,
	LUShr = "LUSHR": Simple,
	IAnd = "IAND": Simple,
	LAnd = "LAND": Simple,
	IOr = "IOR": Simple,
	LOr = "LOR": Simple,
	IXor = "IXOR": Simple,
	LXor = "LXOR": Simple,
	IInc = "IINC": Increment,
	I2L = "I2L": Simple,
	I2F = "I2F": Simple,
	I2D = "I2D": Simple,
	L2I = "L2I": Simple,
	L2F = "L2F": Simple,
	L2D = "L2D": Simple,
	F2I = "F2I": Simple,
	F2L = "F2L": Simple,
	F2D = "F2D": Simple,
	D2I = "D2I": Simple,
	D2L = "D2L": Simple,
	D2F = "D2F": Simple,
	I2B = "I2B": Simple,
	I2C = "I2C": Simple,
	I2S = "I2S": Simple,
	LCmp = "LCMP": Simple,
	FCmpL = "FCMPL": Simple,
	FCmpG = "FCMPG": Simple,
	DCmpL = "DCMPL": Simple,
	DCmpG = "DCMPG": Simple,
	IfEq = "IFEQ": Jump,
	IfNe = "IFNE": Jump,
	IfLt = "IFLT": Jump,
	IfGe = "IFGE": Jump,
	IfGt = "IFGT": Jump,
	IfLe = "IFLE": Jump,
	IfICmpEq = "IF_ICMPEQ": Jump,
	IfICmpNe = "IF_ICMPNE": Jump,
	IfICmpLt = "IF_ICMPLT": Jump,
	IfICmpGe = "IF_ICMPGE": Jump,
	IfICmpGt = "IF_ICMPGT": Jump,
	IfICmpLe = "IF_ICMPLE": Jump,
	IfACmpEq = "IF_ACMPEQ": Jump,
	IfACmpNe = "IF_ACMPNE": Jump,
	Goto = "GOTO": Jump,
	Jsr = "JSR": Jump,
	Ret = "RET": Variable,
	TableSwitch = "TABLESWITCH": TableSwitch,
	LookupSwitch = "LOOKUPSWITCH": LookupSwitch,
	IReturn = "IRETURN": Simple,
	LReturn = "LRETURN": Simple,
	FReturn = "FRETURN": Simple,
	DReturn = "DRETURN": Simple,
	AReturn = "ARETURN": Simple,
	Return = "RETURN": Simple,
	GetStatic = "GETSTATIC": Field,
	PutStatic = "PUTSTATIC": Field,
	GetField = "GETFIELD": Field,
	PutField = "PUTFIELD": Field,
	InvokeVirtual = "INVOKEVIRTUAL": Method,
	InvokeSpecial = "INVOKESPECIAL": Method,
	InvokeStatic = "INVOKESTATIC": Method,
	InvokeInterface = "INVOKEINTERFACE": Method,
	InvokeDynamic = "INVOKEDYNAMIC": InvokeDynamic,
	New = "NEW": Type,
	NewArray = "NEWARRAY": NewArray,
	ANewArray = "ANEWARRAY": Type,
	ArrayLength = "ARRAYLENGTH": Simple,
	AThrow = "ATHROW": Simple,
	CheckCast = "CHECKCAST": Type,
	InstanceOf = "INSTANCEOF": Type,
	MonitorEnter = "MONITORENTER": Simple,
	MonitorExit = "MONITOREXIT": Simple,
	MultiANewArray = "MULTIANEWARRAY": MultiANewArray,
	IfNull = "IFNULL": Jump,
	IfNonNull = "IFNONNULL": Jump,
}

macro_rules! instruction_mapping {
	(
		simple: $( $simple:ident ),* ;
		$( fn $to:ident ( $operand:ty ): $( $variant:ident ),* ; )*
		other: $( $other:ident ),* ;
	) => {
		impl Opcode {
			/// Builds the instruction of an opcode without operands.
			pub(crate) fn to_simple(self) -> Option<Instruction> {
				match self {
					$( Opcode::$simple => Some(Instruction::$simple), )*
					_ => None,
				}
			}

			$(
				pub(crate) fn $to(self, operand: $operand) -> Option<Instruction> {
					match self {
						$( Opcode::$variant => Some(Instruction::$variant(operand)), )*
						_ => None,
					}
				}
			)*

			/// Returns the opcode of an instruction.
			pub fn of(instruction: &Instruction) -> Opcode {
				match instruction {
					$( Instruction::$simple => Opcode::$simple, )*
					$( $( Instruction::$variant(..) => Opcode::$variant, )* )*
					$( Instruction::$other { .. } => Opcode::$other, )*
				}
			}
		}
	}
}

instruction_mapping! {
	simple: Nop, AConstNull,
		IConstM1, IConst0, IConst1, IConst2, IConst3, IConst4, IConst5,
		LConst0, LConst1, FConst0, FConst1, FConst2, DConst0, DConst1,
		IALoad, LALoad, FALoad, DALoad, AALoad, BALoad, CALoad, SALoad,
		IAStore, LAStore, FAStore, DAStore, AAStore, BAStore, CAStore, SAStore,
		Pop, Pop2, Dup, DupX1, DupX2, Dup2, Dup2X1, Dup2X2, Swap,
		IAdd, LAdd, FAdd, DAdd, ISub, LSub, FSub, DSub,
		IMul, LMul, FMul, DMul, IDiv, LDiv, FDiv, DDiv,
		IRem, LRem, FRem, DRem, INeg, LNeg, FNeg, DNeg,
		IShl, LShl, IShr, LShr, IUShr, LUShr,
		IAnd, LAnd, IOr, LOr, IXor, LXor,
		I2L, I2F, I2D, L2I, L2F, L2D, F2I, F2L, F2D, D2I, D2L, D2F, I2B, I2C, I2S,
		LCmp, FCmpL, FCmpG, DCmpL, DCmpG,
		IReturn, LReturn, FReturn, DReturn, AReturn, Return,
		ArrayLength, AThrow, MonitorEnter, MonitorExit;
	fn to_variable(LvIndex): ILoad, LLoad, FLoad, DLoad, ALoad, IStore, LStore, FStore, DStore, AStore, Ret;
	fn to_jump(Label): IfEq, IfNe, IfLt, IfGe, IfGt, IfLe,
		IfICmpEq, IfICmpNe, IfICmpLt, IfICmpGe, IfICmpGt, IfICmpLe,
		IfACmpEq, IfACmpNe, Goto, Jsr, IfNull, IfNonNull;
	fn to_type(ClassName): New, ANewArray, CheckCast, InstanceOf;
	fn to_field(FieldRef): GetStatic, PutStatic, GetField, PutField;
	other: BiPush, SiPush, Ldc, IInc, TableSwitch, LookupSwitch,
		InvokeVirtual, InvokeSpecial, InvokeStatic, InvokeInterface, InvokeDynamic,
		NewArray, MultiANewArray;
}

/// Whether a variable instruction reads or writes its slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VariableOperation {
	Read,
	Write,
}

impl Opcode {
	/// Looks up an opcode by its mnemonic, ignoring case.
	///
	/// ```
	/// use dukeasm::opcode::Opcode;
	/// assert_eq!(Opcode::from_mnemonic("if_icmpeq"), Some(Opcode::IfICmpEq));
	/// assert_eq!(Opcode::from_mnemonic("LABEL"), None);
	/// ```
	pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
		Opcode::ALL.iter()
			.copied()
			.find(|opcode| opcode.mnemonic().eq_ignore_ascii_case(mnemonic))
	}

	/// The category of the slot a variable instruction (or `IINC`) accesses.
	pub fn variable_category(self) -> Option<Category> {
		match self {
			Opcode::ILoad | Opcode::IStore | Opcode::IInc => Some(Category::Int),
			Opcode::LLoad | Opcode::LStore => Some(Category::Long),
			Opcode::FLoad | Opcode::FStore => Some(Category::Float),
			Opcode::DLoad | Opcode::DStore => Some(Category::Double),
			Opcode::ALoad | Opcode::AStore | Opcode::Ret => Some(Category::Object),
			_ => None,
		}
	}

	pub fn variable_operation(self) -> Option<VariableOperation> {
		match self {
			Opcode::ILoad | Opcode::LLoad | Opcode::FLoad | Opcode::DLoad | Opcode::ALoad | Opcode::Ret =>
				Some(VariableOperation::Read),
			Opcode::IStore | Opcode::LStore | Opcode::FStore | Opcode::DStore | Opcode::AStore | Opcode::IInc =>
				Some(VariableOperation::Write),
			_ => None,
		}
	}
}

#[cfg(test)]
mod testing {
	use std::collections::HashSet;
	use pretty_assertions::assert_eq;
	use duke::tree::method::code::{Instruction, Label, LvIndex};
	use crate::opcode::{Family, Opcode};

	#[test]
	fn mnemonics_are_unique() {
		let mnemonics: HashSet<_> = Opcode::ALL.iter().map(|x| x.mnemonic()).collect();
		assert_eq!(mnemonics.len(), Opcode::ALL.len());

		for &opcode in Opcode::ALL {
			assert_eq!(Opcode::from_mnemonic(&opcode.mnemonic().to_lowercase()), Some(opcode));
		}
	}

	#[test]
	fn simple_instructions_map_back() {
		for &opcode in Opcode::ALL {
			match opcode.to_simple() {
				Some(instruction) => {
					assert_eq!(opcode.family(), Family::Simple, "{opcode:?}");
					assert_eq!(Opcode::of(&instruction), opcode);
				},
				None => assert_ne!(opcode.family(), Family::Simple, "{opcode:?}"),
			}
		}
	}

	#[test]
	fn operand_instructions_map_back() {
		let index = LvIndex { index: 3 };
		for &opcode in Opcode::ALL {
			if let Some(instruction) = opcode.to_variable(index) {
				assert_eq!(Opcode::of(&instruction), opcode);
				assert!(opcode.variable_category().is_some());
			}
			if let Some(instruction) = opcode.to_jump(Label::new(5)) {
				assert_eq!(opcode.family(), Family::Jump);
				assert_eq!(Opcode::of(&instruction), opcode);
			}
		}
		assert_eq!(Opcode::of(&Instruction::IInc(index, 1)), Opcode::IInc);
		assert_eq!(Opcode::of(&Instruction::MultiANewArray(duke_macros::class_name!("[[I").to_owned(), 2)), Opcode::MultiANewArray);
	}
}
