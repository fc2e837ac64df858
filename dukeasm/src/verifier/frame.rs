//! The abstract values of the verifier, and the effect each instruction has on them.

use std::fmt::{Display, Formatter};
use duke::tree::descriptor::{ParsedFieldDescriptor, Type};
use duke::tree::field::FieldDescriptorSlice;
use duke::tree::method::code::{Instruction, Loadable, LvIndex};
use duke::tree::method::MethodDescriptorSlice;
use crate::error::VerifyErrorKind;

/// A value in a local variable slot or on the operand stack.
///
/// Longs and doubles are a single value on the stack, but take two words. In the local variables they're followed
/// by a [`Value::Top`] slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
	/// An unusable value, like an uninitialized slot or the merge of two different values.
	Top,
	Int,
	Float,
	Long,
	Double,
	Reference,
	ReturnAddress,
}

impl Value {
	/// The number of words the value takes.
	pub fn size(self) -> usize {
		match self {
			Value::Long | Value::Double => 2,
			_ => 1,
		}
	}

	pub fn of(t: &Type) -> Value {
		match t {
			Type::B | Type::C | Type::I | Type::S | Type::Z => Value::Int,
			Type::F => Value::Float,
			Type::J => Value::Long,
			Type::D => Value::Double,
			Type::Object(_) | Type::Array(_, _) => Value::Reference,
		}
	}

	fn merge(self, other: Value) -> Value {
		if self == other { self } else { Value::Top }
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Value::Top => "top",
			Value::Int => "int",
			Value::Float => "float",
			Value::Long => "long",
			Value::Double => "double",
			Value::Reference => "reference",
			Value::ReturnAddress => "return address",
		})
	}
}

/// What an instruction needs to find.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Expected {
	Int,
	Float,
	Long,
	Double,
	Reference,
	/// Any value taking one word.
	Category1,
	/// Any value taking two words.
	Category2,
	ReturnAddress,
}

impl Expected {
	pub fn of(t: &Type) -> Expected {
		match Value::of(t) {
			Value::Int => Expected::Int,
			Value::Float => Expected::Float,
			Value::Long => Expected::Long,
			Value::Double => Expected::Double,
			_ => Expected::Reference,
		}
	}

	pub fn matches(self, value: Value) -> bool {
		match self {
			Expected::Int => value == Value::Int,
			Expected::Float => value == Value::Float,
			Expected::Long => value == Value::Long,
			Expected::Double => value == Value::Double,
			Expected::Reference => value == Value::Reference,
			Expected::Category1 => value.size() == 1,
			Expected::Category2 => value.size() == 2,
			Expected::ReturnAddress => value == Value::ReturnAddress,
		}
	}
}

impl Display for Expected {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Expected::Int => "int",
			Expected::Float => "float",
			Expected::Long => "long",
			Expected::Double => "double",
			Expected::Reference => "reference",
			Expected::Category1 => "a category 1 value",
			Expected::Category2 => "a category 2 value",
			Expected::ReturnAddress => "return address",
		})
	}
}

fn field_type(desc: &FieldDescriptorSlice) -> Result<Type, VerifyErrorKind> {
	desc.parse()
		.map(|parsed| parsed.0)
		.map_err(|_| VerifyErrorKind::InvalidDescriptor(desc.as_inner().to_owned()))
}

fn return_mismatch(instruction: &'static str, return_type: Option<&Type>) -> VerifyErrorKind {
	VerifyErrorKind::ReturnTypeMismatch {
		instruction,
		return_type: return_type.map_or_else(|| "V".to_owned(), |t| ParsedFieldDescriptor(t.clone()).write().as_inner().to_owned()),
	}
}

fn method_types(desc: &MethodDescriptorSlice) -> Result<(Vec<Type>, Option<Type>), VerifyErrorKind> {
	desc.parse()
		.map(|parsed| (parsed.parameter_descriptors, parsed.return_descriptor))
		.map_err(|_| VerifyErrorKind::InvalidDescriptor(desc.as_inner().to_owned()))
}

/// The local variables and the operand stack before or after an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
	locals: Vec<Value>,
	stack: Vec<Value>,
	max_stack: u16,
}

impl Frame {
	pub fn new(max_locals: u16, max_stack: u16) -> Frame {
		Frame {
			locals: vec![Value::Top; usize::from(max_locals)],
			stack: Vec::new(),
			max_stack,
		}
	}

	/// The frame at the start of a method: `this` (for non static methods) and the parameters in the local variables,
	/// and an empty stack.
	pub fn initial(is_static: bool, parameters: &[Type], max_locals: u16, max_stack: u16) -> Result<Frame, VerifyErrorKind> {
		let mut frame = Frame::new(max_locals, max_stack);
		let mut index = 0;
		if !is_static {
			frame.store(index, Value::Reference)?;
			index += 1;
		}
		for parameter in parameters {
			frame.store(index, Value::of(parameter))?;
			// a u16 can't overflow here, as the store would have failed
			index = index.saturating_add(parameter.size());
		}
		Ok(frame)
	}

	pub fn locals(&self) -> &[Value] {
		&self.locals
	}

	pub fn stack(&self) -> &[Value] {
		&self.stack
	}

	/// The stack size in words.
	pub fn stack_words(&self) -> usize {
		self.stack.iter().map(|value| value.size()).sum()
	}

	/// The frame an exception handler starts with: the same locals, and only the exception on the stack.
	pub(crate) fn for_handler(&self) -> Frame {
		Frame {
			locals: self.locals.clone(),
			stack: vec![Value::Reference],
			max_stack: self.max_stack,
		}
	}

	pub fn push(&mut self, value: Value) -> Result<(), VerifyErrorKind> {
		if self.stack_words() + value.size() > usize::from(self.max_stack) {
			return Err(VerifyErrorKind::StackOverflow { max: self.max_stack });
		}
		self.stack.push(value);
		Ok(())
	}

	pub fn pop(&mut self) -> Result<Value, VerifyErrorKind> {
		self.stack.pop().ok_or(VerifyErrorKind::StackUnderflow)
	}

	pub fn pop_expect(&mut self, expected: Expected) -> Result<Value, VerifyErrorKind> {
		let found = self.pop()?;
		if expected.matches(found) {
			Ok(found)
		} else {
			Err(VerifyErrorKind::TypeMismatch { expected, found })
		}
	}

	fn check_index(&self, index: u16, size: usize) -> Result<usize, VerifyErrorKind> {
		let start = usize::from(index);
		if start + size > self.locals.len() {
			return Err(VerifyErrorKind::LocalIndexOutOfBounds {
				index,
				max_locals: u16::try_from(self.locals.len()).unwrap_or(u16::MAX),
			});
		}
		Ok(start)
	}

	pub fn load(&self, index: u16, expected: Expected) -> Result<Value, VerifyErrorKind> {
		let size = if expected == Expected::Long || expected == Expected::Double { 2 } else { 1 };
		let start = self.check_index(index, size)?;
		let found = self.locals[start];
		if expected.matches(found) {
			Ok(found)
		} else {
			Err(VerifyErrorKind::TypeMismatch { expected, found })
		}
	}

	pub fn store(&mut self, index: u16, value: Value) -> Result<(), VerifyErrorKind> {
		let start = self.check_index(index, value.size())?;
		if start > 0 && self.locals[start - 1].size() == 2 {
			self.locals[start - 1] = Value::Top;
		}
		self.locals[start] = value;
		if value.size() == 2 {
			self.locals[start + 1] = Value::Top;
		}
		Ok(())
	}

	/// Merges another frame into this one, returning whether this frame changed.
	pub fn merge(&mut self, other: &Frame) -> Result<bool, VerifyErrorKind> {
		if self.stack.len() != other.stack.len() {
			return Err(VerifyErrorKind::StackHeightMismatch {
				expected: self.stack.len(),
				found: other.stack.len(),
			});
		}
		let mut changed = false;
		for (a, &b) in self.locals.iter_mut().zip(&other.locals).chain(self.stack.iter_mut().zip(&other.stack)) {
			let merged = a.merge(b);
			if merged != *a {
				*a = merged;
				changed = true;
			}
		}
		Ok(changed)
	}

	fn binary(&mut self, operand: Expected, result: Value) -> Result<(), VerifyErrorKind> {
		self.pop_expect(operand)?;
		self.pop_expect(operand)?;
		self.push(result)
	}

	fn unary(&mut self, operand: Expected, result: Value) -> Result<(), VerifyErrorKind> {
		self.pop_expect(operand)?;
		self.push(result)
	}

	fn push_all(&mut self, values: &[Value]) -> Result<(), VerifyErrorKind> {
		values.iter().try_for_each(|&value| self.push(value))
	}

	fn pop_category(&mut self, expected: Expected) -> Result<Value, VerifyErrorKind> {
		self.pop_expect(expected)
	}

	fn array_load(&mut self, result: Value) -> Result<(), VerifyErrorKind> {
		self.pop_expect(Expected::Int)?;
		self.pop_expect(Expected::Reference)?;
		self.push(result)
	}

	fn array_store(&mut self, element: Expected) -> Result<(), VerifyErrorKind> {
		self.pop_expect(element)?;
		self.pop_expect(Expected::Int)?;
		self.pop_expect(Expected::Reference)?;
		Ok(())
	}

	fn invoke(&mut self, desc: &MethodDescriptorSlice, receiver: bool) -> Result<(), VerifyErrorKind> {
		let (parameters, return_type) = method_types(desc)?;
		for parameter in parameters.iter().rev() {
			self.pop_expect(Expected::of(parameter))?;
		}
		if receiver {
			self.pop_expect(Expected::Reference)?;
		}
		if let Some(return_type) = return_type {
			self.push(Value::of(&return_type))?;
		}
		Ok(())
	}

	fn return_value(&mut self, mnemonic: &'static str, found: Value, return_type: Option<&Type>) -> Result<(), VerifyErrorKind> {
		let expected = match found {
			Value::Int => Expected::Int,
			Value::Float => Expected::Float,
			Value::Long => Expected::Long,
			Value::Double => Expected::Double,
			_ => Expected::Reference,
		};
		self.pop_expect(expected)?;
		match return_type {
			Some(t) if Expected::of(t).matches(found) => Ok(()),
			_ => Err(return_mismatch(mnemonic, return_type)),
		}
	}

	/// Applies the effect of an instruction on this frame.
	///
	/// `return_type` is the return type of the method, [`None`] for `void`.
	pub fn execute(&mut self, instruction: &Instruction, return_type: Option<&Type>) -> Result<(), VerifyErrorKind> {
		use Instruction as I;
		use Expected as E;
		use Value as V;

		match instruction {
			I::Nop => Ok(()),
			I::AConstNull => self.push(V::Reference),
			I::IConstM1 | I::IConst0 | I::IConst1 | I::IConst2 | I::IConst3 | I::IConst4 | I::IConst5 |
			I::BiPush(_) | I::SiPush(_) => self.push(V::Int),
			I::LConst0 | I::LConst1 => self.push(V::Long),
			I::FConst0 | I::FConst1 | I::FConst2 => self.push(V::Float),
			I::DConst0 | I::DConst1 => self.push(V::Double),
			I::Ldc(loadable) => {
				let value = match loadable {
					Loadable::Integer(_) => V::Int,
					Loadable::Float(_) => V::Float,
					Loadable::Long(_) => V::Long,
					Loadable::Double(_) => V::Double,
					Loadable::Class(_) | Loadable::String(_) | Loadable::MethodHandle(_) | Loadable::MethodType(_) =>
						V::Reference,
					Loadable::Dynamic(dynamic) => V::of(&field_type(&dynamic.descriptor)?),
				};
				self.push(value)
			},

			I::ILoad(LvIndex { index }) => self.load(*index, E::Int).and_then(|v| self.push(v)),
			I::LLoad(LvIndex { index }) => self.load(*index, E::Long).and_then(|v| self.push(v)),
			I::FLoad(LvIndex { index }) => self.load(*index, E::Float).and_then(|v| self.push(v)),
			I::DLoad(LvIndex { index }) => self.load(*index, E::Double).and_then(|v| self.push(v)),
			I::ALoad(LvIndex { index }) => self.load(*index, E::Reference).and_then(|v| self.push(v)),

			I::IALoad | I::BALoad | I::CALoad | I::SALoad => self.array_load(V::Int),
			I::LALoad => self.array_load(V::Long),
			I::FALoad => self.array_load(V::Float),
			I::DALoad => self.array_load(V::Double),
			I::AALoad => self.array_load(V::Reference),

			I::IStore(LvIndex { index }) => self.pop_expect(E::Int).and_then(|v| self.store(*index, v)),
			I::LStore(LvIndex { index }) => self.pop_expect(E::Long).and_then(|v| self.store(*index, v)),
			I::FStore(LvIndex { index }) => self.pop_expect(E::Float).and_then(|v| self.store(*index, v)),
			I::DStore(LvIndex { index }) => self.pop_expect(E::Double).and_then(|v| self.store(*index, v)),
			I::AStore(LvIndex { index }) => {
				let value = self.pop()?;
				if value != V::Reference && value != V::ReturnAddress {
					return Err(VerifyErrorKind::TypeMismatch { expected: E::Reference, found: value });
				}
				self.store(*index, value)
			},

			I::IAStore | I::BAStore | I::CAStore | I::SAStore => self.array_store(E::Int),
			I::LAStore => self.array_store(E::Long),
			I::FAStore => self.array_store(E::Float),
			I::DAStore => self.array_store(E::Double),
			I::AAStore => self.array_store(E::Reference),

			I::Pop => self.pop_category(E::Category1).map(|_| ()),
			I::Pop2 => {
				if self.pop()?.size() == 1 {
					self.pop_category(E::Category1)?;
				}
				Ok(())
			},
			I::Dup => {
				let v1 = self.pop_category(E::Category1)?;
				self.push_all(&[v1, v1])
			},
			I::DupX1 => {
				let v1 = self.pop_category(E::Category1)?;
				let v2 = self.pop_category(E::Category1)?;
				self.push_all(&[v1, v2, v1])
			},
			I::DupX2 => {
				let v1 = self.pop_category(E::Category1)?;
				let v2 = self.pop()?;
				if v2.size() == 2 {
					self.push_all(&[v1, v2, v1])
				} else {
					let v3 = self.pop_category(E::Category1)?;
					self.push_all(&[v1, v3, v2, v1])
				}
			},
			I::Dup2 => {
				let v1 = self.pop()?;
				if v1.size() == 2 {
					self.push_all(&[v1, v1])
				} else {
					let v2 = self.pop_category(E::Category1)?;
					self.push_all(&[v2, v1, v2, v1])
				}
			},
			I::Dup2X1 => {
				let v1 = self.pop()?;
				if v1.size() == 2 {
					let v2 = self.pop_category(E::Category1)?;
					self.push_all(&[v1, v2, v1])
				} else {
					let v2 = self.pop_category(E::Category1)?;
					let v3 = self.pop_category(E::Category1)?;
					self.push_all(&[v2, v1, v3, v2, v1])
				}
			},
			I::Dup2X2 => {
				let v1 = self.pop()?;
				if v1.size() == 2 {
					let v2 = self.pop()?;
					if v2.size() == 2 {
						self.push_all(&[v1, v2, v1])
					} else {
						let v3 = self.pop_category(E::Category1)?;
						self.push_all(&[v1, v3, v2, v1])
					}
				} else {
					let v2 = self.pop_category(E::Category1)?;
					let v3 = self.pop()?;
					if v3.size() == 2 {
						self.push_all(&[v2, v1, v3, v2, v1])
					} else {
						let v4 = self.pop_category(E::Category1)?;
						self.push_all(&[v2, v1, v4, v3, v2, v1])
					}
				}
			},
			I::Swap => {
				let v1 = self.pop_category(E::Category1)?;
				let v2 = self.pop_category(E::Category1)?;
				self.push_all(&[v1, v2])
			},

			I::IAdd | I::ISub | I::IMul | I::IDiv | I::IRem | I::IShl | I::IShr | I::IUShr | I::IAnd | I::IOr | I::IXor =>
				self.binary(E::Int, V::Int),
			I::LAdd | I::LSub | I::LMul | I::LDiv | I::LRem | I::LAnd | I::LOr | I::LXor => self.binary(E::Long, V::Long),
			I::FAdd | I::FSub | I::FMul | I::FDiv | I::FRem => self.binary(E::Float, V::Float),
			I::DAdd | I::DSub | I::DMul | I::DDiv | I::DRem => self.binary(E::Double, V::Double),
			I::LShl | I::LShr | I::LUShr => {
				self.pop_expect(E::Int)?;
				self.unary(E::Long, V::Long)
			},
			I::INeg => self.unary(E::Int, V::Int),
			I::LNeg => self.unary(E::Long, V::Long),
			I::FNeg => self.unary(E::Float, V::Float),
			I::DNeg => self.unary(E::Double, V::Double),
			I::IInc(LvIndex { index }, _) => self.load(*index, E::Int).map(|_| ()),

			I::I2L => self.unary(E::Int, V::Long),
			I::I2F => self.unary(E::Int, V::Float),
			I::I2D => self.unary(E::Int, V::Double),
			I::L2I => self.unary(E::Long, V::Int),
			I::L2F => self.unary(E::Long, V::Float),
			I::L2D => self.unary(E::Long, V::Double),
			I::F2I => self.unary(E::Float, V::Int),
			I::F2L => self.unary(E::Float, V::Long),
			I::F2D => self.unary(E::Float, V::Double),
			I::D2I => self.unary(E::Double, V::Int),
			I::D2L => self.unary(E::Double, V::Long),
			I::D2F => self.unary(E::Double, V::Float),
			I::I2B | I::I2C | I::I2S => self.unary(E::Int, V::Int),

			I::LCmp => self.binary(E::Long, V::Int),
			I::FCmpL | I::FCmpG => self.binary(E::Float, V::Int),
			I::DCmpL | I::DCmpG => self.binary(E::Double, V::Int),

			I::IfEq(_) | I::IfNe(_) | I::IfLt(_) | I::IfGe(_) | I::IfGt(_) | I::IfLe(_) =>
				self.pop_expect(E::Int).map(|_| ()),
			I::IfICmpEq(_) | I::IfICmpNe(_) | I::IfICmpLt(_) | I::IfICmpGe(_) | I::IfICmpGt(_) | I::IfICmpLe(_) => {
				self.pop_expect(E::Int)?;
				self.pop_expect(E::Int).map(|_| ())
			},
			I::IfACmpEq(_) | I::IfACmpNe(_) => {
				self.pop_expect(E::Reference)?;
				self.pop_expect(E::Reference).map(|_| ())
			},
			I::IfNull(_) | I::IfNonNull(_) => self.pop_expect(E::Reference).map(|_| ()),
			I::Goto(_) => Ok(()),
			I::Jsr(_) => self.push(V::ReturnAddress),
			I::Ret(LvIndex { index }) => self.load(*index, E::ReturnAddress).map(|_| ()),
			I::TableSwitch { .. } | I::LookupSwitch { .. } => self.pop_expect(E::Int).map(|_| ()),

			I::IReturn => self.return_value("IRETURN", V::Int, return_type),
			I::LReturn => self.return_value("LRETURN", V::Long, return_type),
			I::FReturn => self.return_value("FRETURN", V::Float, return_type),
			I::DReturn => self.return_value("DRETURN", V::Double, return_type),
			I::AReturn => self.return_value("ARETURN", V::Reference, return_type),
			I::Return => match return_type {
				None => Ok(()),
				Some(_) => Err(return_mismatch("RETURN", return_type)),
			},

			I::GetStatic(field) => self.push(V::of(&field_type(&field.desc)?)),
			I::PutStatic(field) => self.pop_expect(E::of(&field_type(&field.desc)?)).map(|_| ()),
			I::GetField(field) => {
				let t = field_type(&field.desc)?;
				self.unary(E::Reference, V::of(&t))
			},
			I::PutField(field) => {
				self.pop_expect(E::of(&field_type(&field.desc)?))?;
				self.pop_expect(E::Reference).map(|_| ())
			},
			I::InvokeVirtual(method) | I::InvokeSpecial(method, _) | I::InvokeInterface(method) =>
				self.invoke(&method.desc, true),
			I::InvokeStatic(method, _) => self.invoke(&method.desc, false),
			I::InvokeDynamic(dynamic) => self.invoke(&dynamic.descriptor, false),

			I::New(_) => self.push(V::Reference),
			I::NewArray(_) | I::ANewArray(_) => self.unary(E::Int, V::Reference),
			I::ArrayLength => self.unary(E::Reference, V::Int),
			I::AThrow => self.pop_expect(E::Reference).map(|_| ()),
			I::CheckCast(_) => self.unary(E::Reference, V::Reference),
			I::InstanceOf(_) => self.unary(E::Reference, V::Int),
			I::MonitorEnter | I::MonitorExit => self.pop_expect(E::Reference).map(|_| ()),
			I::MultiANewArray(_, dimensions) => {
				for _ in 0..*dimensions {
					self.pop_expect(E::Int)?;
				}
				self.push(V::Reference)
			},
		}
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::tree::descriptor::{ParsedFieldDescriptor, Type};
	use duke::tree::method::code::{Instruction, LvIndex};
	use crate::error::VerifyErrorKind;
	use crate::verifier::frame::{Expected, Frame, Value};

	fn run(frame: &mut Frame, instructions: &[Instruction]) -> Result<(), VerifyErrorKind> {
		instructions.iter().try_for_each(|instruction| frame.execute(instruction, None))
	}

	#[test]
	fn initial_frame() {
		let frame = Frame::initial(false, &[Type::J, Type::I], 4, 10).unwrap();
		assert_eq!(frame.locals(), &[Value::Reference, Value::Long, Value::Top, Value::Int]);

		assert_eq!(Frame::initial(true, &[Type::D], 1, 10), Err(VerifyErrorKind::LocalIndexOutOfBounds { index: 0, max_locals: 1 }));
	}

	#[test]
	fn dup_forms() {
		let mut frame = Frame::new(0, 10);
		run(&mut frame, &[Instruction::IConst0, Instruction::FConst0, Instruction::DupX1]).unwrap();
		assert_eq!(frame.stack(), &[Value::Float, Value::Int, Value::Float]);

		let mut frame = Frame::new(0, 10);
		run(&mut frame, &[Instruction::IConst0, Instruction::LConst0, Instruction::Dup2X1]).unwrap();
		assert_eq!(frame.stack(), &[Value::Long, Value::Int, Value::Long]);

		let mut frame = Frame::new(0, 10);
		run(&mut frame, &[Instruction::IConst0, Instruction::FConst0, Instruction::Dup2]).unwrap();
		assert_eq!(frame.stack(), &[Value::Int, Value::Float, Value::Int, Value::Float]);
		assert_eq!(frame.stack_words(), 4);

		let mut frame = Frame::new(0, 10);
		assert_eq!(run(&mut frame, &[Instruction::LConst0, Instruction::Dup]),
			Err(VerifyErrorKind::TypeMismatch { expected: Expected::Category1, found: Value::Long }));
	}

	#[test]
	fn stack_limits() {
		let mut frame = Frame::new(0, 3);
		assert_eq!(run(&mut frame, &[Instruction::Pop]), Err(VerifyErrorKind::StackUnderflow));
		assert_eq!(run(&mut frame, &[Instruction::DConst0, Instruction::LConst0]), Err(VerifyErrorKind::StackOverflow { max: 3 }));
	}

	#[test]
	fn locals() {
		let mut frame = Frame::new(3, 10);
		run(&mut frame, &[Instruction::LConst1, Instruction::LStore(LvIndex { index: 1 })]).unwrap();
		assert_eq!(frame.locals(), &[Value::Top, Value::Long, Value::Top]);
		assert_eq!(run(&mut frame, &[Instruction::ILoad(LvIndex { index: 2 })]),
			Err(VerifyErrorKind::TypeMismatch { expected: Expected::Int, found: Value::Top }));
		assert_eq!(run(&mut frame, &[Instruction::ILoad(LvIndex { index: 3 })]),
			Err(VerifyErrorKind::LocalIndexOutOfBounds { index: 3, max_locals: 3 }));

		// overwriting the upper half of a long invalidates it
		run(&mut frame, &[Instruction::IConst0, Instruction::IStore(LvIndex { index: 2 })]).unwrap();
		assert_eq!(frame.locals(), &[Value::Top, Value::Top, Value::Int]);
	}

	#[test]
	fn merging() {
		let mut a = Frame::new(1, 10);
		a.push(Value::Int).unwrap();
		let mut b = Frame::new(1, 10);
		b.push(Value::Float).unwrap();
		assert_eq!(a.merge(&b), Ok(true));
		assert_eq!(a.stack(), &[Value::Top]);
		assert_eq!(a.merge(&b), Ok(false));

		let empty = Frame::new(1, 10);
		assert_eq!(a.merge(&empty), Err(VerifyErrorKind::StackHeightMismatch { expected: 1, found: 0 }));
	}

	#[test]
	fn returns() {
		let mut frame = Frame::new(0, 10);
		frame.push(Value::Int).unwrap();
		assert_eq!(frame.clone().execute(&Instruction::IReturn, Some(&Type::Z)), Ok(()));
		assert_eq!(frame.clone().execute(&Instruction::AReturn, Some(&Type::I)),
			Err(VerifyErrorKind::TypeMismatch { expected: Expected::Reference, found: Value::Int }));
		assert_eq!(frame.clone().execute(&Instruction::IReturn, Some(&Type::J)),
			Err(VerifyErrorKind::ReturnTypeMismatch { instruction: "IRETURN", return_type: "J".to_owned() }));
		assert_eq!(frame.execute(&Instruction::Return, Some(&Type::I)),
			Err(VerifyErrorKind::ReturnTypeMismatch { instruction: "RETURN", return_type: "I".to_owned() }));

		let mut frame = Frame::new(0, 10);
		frame.push(Value::Reference).unwrap();
		let error = frame.execute(&Instruction::AReturn, None).unwrap_err();
		assert_eq!(error, VerifyErrorKind::ReturnTypeMismatch { instruction: "ARETURN", return_type: "V".to_owned() });
		assert_eq!(error.to_string(), "ARETURN doesn't match the return type V of the method");
	}
}
