//! The errors of assembling, disassembling and verifying.
//!
//! Assembly never stops at the first problem: every failing line becomes a [`LineError`], and
//! [`AssemblyError::Failed`] carries all of them at once.

use std::fmt::{Display, Formatter};
use thiserror::Error;
use crate::ast::code::Statement;
use crate::assembler::variables::Category;
use crate::verifier::frame::{Expected, Value};

/// A piece of text could not be parsed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot parse {text:?}{}", .detail.as_ref().map(|detail| format!(": {detail}")).unwrap_or_default())]
pub struct ParseError {
	/// The offending text.
	pub text: String,
	pub detail: Option<String>,
}

impl ParseError {
	pub fn new(text: impl Into<String>, detail: impl Into<String>) -> ParseError {
		ParseError { text: text.into(), detail: Some(detail.into()) }
	}

	pub fn without_detail(text: impl Into<String>) -> ParseError {
		ParseError { text: text.into(), detail: None }
	}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
	#[error("unresolved label: {0}")]
	Unresolved(String),
	#[error("duplicate label declaration: {0}")]
	Duplicate(String),
	#[error("too many labels, at most {max} are possible", max = u16::MAX)]
	TooMany,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VariableError {
	#[error("variable {name:?} (slot {slot}) is bound to {bound}, cannot use it as {requested}")]
	TypeConflict {
		name: String,
		slot: u16,
		bound: Category,
		requested: Category,
	},
	#[error("variable {0:?} doesn't fit into the local variable slots")]
	SlotOutOfRange(String),
	#[error("parameter {name:?} is passed in slot {slot}")]
	ParameterSlot {
		name: String,
		slot: u16,
	},
	#[error("unresolved variable: {0}")]
	Unresolved(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AliasError {
	#[error("unknown alias: {0}")]
	Unknown(String),
	#[error("unterminated alias reference in {0:?}")]
	Unterminated(String),
	#[error("malformed alias declaration {0:?}, expected `alias <name> \"<value>\"`")]
	Malformed(String),
}

/// A statement was parsed, but can't be turned into an instruction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
	#[error("invalid string literal {text:?}: {detail}")]
	InvalidString {
		text: String,
		detail: String,
	},
	#[error("operand {value} of {mnemonic} is out of range")]
	OperandOutOfRange {
		mnemonic: &'static str,
		value: i64,
	},
	#[error("unsupported constant: {0}")]
	UnsupportedConstant(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerifyErrorKind {
	#[error("stack underflow")]
	StackUnderflow,
	#[error("stack overflow, the maximum stack size is {max}")]
	StackOverflow {
		max: u16,
	},
	#[error("type mismatch, expected {expected} but found {found}")]
	TypeMismatch {
		expected: Expected,
		found: Value,
	},
	#[error("{instruction} doesn't match the return type {return_type} of the method")]
	ReturnTypeMismatch {
		instruction: &'static str,
		return_type: String,
	},
	#[error("local variable index {index} is out of bounds, the maximum is {max_locals}")]
	LocalIndexOutOfBounds {
		index: u16,
		max_locals: u16,
	},
	#[error("stack height mismatch when merging frames, {expected} vs {found}")]
	StackHeightMismatch {
		expected: usize,
		found: usize,
	},
	#[error("jump to a label with id {0} that is not part of the code")]
	UndeclaredLabel(u16),
	#[error("execution can fall off the end of the code")]
	FallOffEnd,
	#[error("analysis didn't finish within {0} iterations")]
	IterationLimit(usize),
	#[error("invalid descriptor: {0}")]
	InvalidDescriptor(String),
}

/// A verification failure, at the index of the failing entry of the instruction list (if known).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct VerifyError {
	pub index: Option<usize>,
	pub kind: VerifyErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineErrorKind {
	#[error("Missing assembler for: {0}")]
	MissingAssembler(String),
	#[error("Unfinished assembler for: {mnemonic}: {error}")]
	UnfinishedAssembler {
		mnemonic: String,
		error: ParseError,
	},
	#[error(transparent)]
	Label(#[from] LabelError),
	#[error(transparent)]
	Variable(#[from] VariableError),
	#[error(transparent)]
	Alias(#[from] AliasError),
	#[error(transparent)]
	Resolve(#[from] ResolveError),
	#[error("Verification failed: {0}")]
	Verification(#[from] VerifyError),
}

/// An error attributed to a 1-based source line, or unattributed.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct LineError {
	pub line: Option<u32>,
	pub kind: LineErrorKind,
}

impl LineError {
	/// The line used for unattributed errors.
	pub const UNATTRIBUTED: i64 = -1;

	pub fn new(line: u32, kind: impl Into<LineErrorKind>) -> LineError {
		LineError { line: Some(line), kind: kind.into() }
	}

	pub fn unattributed(kind: impl Into<LineErrorKind>) -> LineError {
		LineError { line: None, kind: kind.into() }
	}

	/// Returns the line number, with [`LineError::UNATTRIBUTED`] if there's none.
	pub fn line_number(&self) -> i64 {
		self.line.map_or(Self::UNATTRIBUTED, i64::from)
	}

	/// Returns the `(line, message)` pair shown to users.
	pub fn to_pair(&self) -> (i64, String) {
		(self.line_number(), self.kind.to_string())
	}
}

impl Display for LineError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "line {}: {}", self.line_number(), self.kind)
	}
}

/// The statements that did parse, and the errors of all the lines that didn't.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyFailure {
	pub errors: Vec<LineError>,
	/// The successfully parsed statements with their line numbers.
	pub partial: Vec<(u32, Statement)>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
	#[error("no method declaration given, declare the method before assembling")]
	MissingDeclaration,
	#[error("assembly failed with {} errors", .0.errors.len())]
	Failed(Box<AssemblyFailure>),
}

impl AssemblyError {
	/// Returns the line errors, which is empty for [`AssemblyError::MissingDeclaration`].
	pub fn errors(&self) -> &[LineError] {
		match self {
			AssemblyError::MissingDeclaration => &[],
			AssemblyError::Failed(failure) => &failure.errors,
		}
	}
}

#[derive(Debug, Error)]
pub enum DisassemblyError {
	#[error("invalid descriptor {descriptor}")]
	Descriptor {
		descriptor: String,
		#[source]
		source: anyhow::Error,
	},
}
