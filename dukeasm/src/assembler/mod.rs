//! Assembling method bodies from text.
//!
//! An [`Assembler`] first needs a method declaration, given with [`Assembler::declare`] or
//! [`Assembler::declare_method`]. Then [`Assembler::assemble`] runs the text through these phases:
//! - aliases are expanded ([`alias`]),
//! - every line is parsed on its own, registering label and variable names ([`labels`], [`variables`]),
//! - names are resolved into the instruction list of a [`duke::tree::method::code::Code`],
//! - and finally the code is verified ([`crate::verifier`]).
//!
//! A failing line doesn't stop the assembly. All errors are collected, each with the line it came from.

pub mod alias;
pub mod labels;
mod literal;
pub(crate) mod parser;
mod resolve;
pub mod variables;

use anyhow::{Context, Result};
use log::{debug, trace, warn};
use duke::tree::class::ClassName;
use duke::tree::descriptor::ParsedFieldDescriptor;
use duke::tree::field::FieldDescriptor;
use duke::tree::method::code::{Code, InstructionListEntry, LabelRange, LocalVariableName, Lv, LvIndex};
use duke::tree::method::{Method, MethodAccess, MethodDescriptor, MethodName, MethodSignature};
use crate::assembler::alias::AliasTable;
use crate::assembler::labels::LabelTable;
use crate::assembler::parser::{is_skipped, parse_statement, ParseContext};
use crate::assembler::resolve::{resolve, Resolved};
use crate::assembler::variables::{Category, VariableTable};
use crate::ast::code::Statement;
use crate::ast::method::{MethodDefinition, MethodParameter};
use crate::ast::Definition;
use crate::ast::modifier::{Modifier, ModifierTarget, Modifiers};
use crate::error::{AssemblyError, AssemblyFailure, LineError, LineErrorKind, ParseError};
use crate::verifier;

/// The maximum stack size of all assembled code.
pub const MAX_STACK: u16 = 0xFF;

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerOptions {
	/// Whether to run the verifier on the assembled code.
	pub verify: bool,
	/// Whether to emit a local variable table with an entry for each named variable.
	pub generate_locals: bool,
	/// The class the method is in, used for the type of `this` in generated local variable tables.
	pub host_type: Option<ClassName>,
	pub max_verifier_iterations: usize,
}

impl Default for AssemblerOptions {
	fn default() -> Self {
		AssemblerOptions {
			verify: true,
			generate_locals: false,
			host_type: None,
			max_verifier_iterations: 100_000,
		}
	}
}

/// The phase an [`Assembler`] is in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
	Unstarted,
	Declared,
	Parsing,
	Resolving,
	Verifying,
	Done,
	Failed,
}

/// A successfully assembled method.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
	pub method: Method,
	/// The 1-based source line of each entry in the instruction list of the code, if it has one.
	pub line_index: Vec<Option<u32>>,
}

impl Assembled {
	/// Gets the source line of an entry of the instruction list.
	pub fn line_of(&self, index: usize) -> Option<u32> {
		self.line_index.get(index).copied().flatten()
	}
}

#[derive(Debug, Clone)]
pub struct Assembler {
	options: AssemblerOptions,
	state: State,
	declaration: Option<MethodDefinition>,
}

fn category_of(desc: &FieldDescriptor) -> Category {
	match desc.as_inner().as_bytes().first() {
		Some(b'J') => Category::Long,
		Some(b'D') => Category::Double,
		Some(b'F') => Category::Float,
		Some(b'L' | b'[') => Category::Object,
		_ => Category::Int,
	}
}

impl Assembler {
	pub fn new(options: AssemblerOptions) -> Assembler {
		Assembler {
			options,
			state: State::Unstarted,
			declaration: None,
		}
	}

	pub fn options(&self) -> &AssemblerOptions {
		&self.options
	}

	pub fn state(&self) -> State {
		self.state
	}

	fn enter(&mut self, state: State) {
		debug!("assembler: {:?} -> {state:?}", self.state);
		self.state = state;
	}

	/// Sets the method the following calls to [`Assembler::assemble`] assemble code for.
	pub fn declare(&mut self, declaration: MethodDefinition) {
		self.declaration = Some(declaration);
		self.enter(State::Declared);
	}

	/// Declares a method by its access, name and descriptor. The parameters are named by their slot numbers.
	pub fn declare_method(&mut self, access: MethodAccess, name: &str, descriptor: &str) -> Result<()> {
		let name = MethodName::try_from(name)?;
		let descriptor = MethodDescriptor::try_from(descriptor)?;
		let parsed = descriptor.parse()
			.with_context(|| format!("failed to parse descriptor of method {name}"))?;

		let mut slot: u16 = if access.is_static { 0 } else { 1 };
		let mut parameters = Vec::with_capacity(parsed.parameter_descriptors.len());
		for t in parsed.parameter_descriptors {
			let size = t.size();
			parameters.push(MethodParameter {
				desc: ParsedFieldDescriptor(t).write(),
				name: slot.to_string(),
			});
			slot = slot.checked_add(size).context("too many parameters")?;
		}
		let return_type = parsed.return_descriptor.map(|t| ParsedFieldDescriptor(t).write());

		let modifiers = Modifiers::from_flags(access.into(), ModifierTarget::Method);
		self.declare(MethodDefinition::new(modifiers, name, parameters, return_type));
		Ok(())
	}

	/// Assembles the body of the declared method.
	pub fn assemble(&mut self, text: &str) -> Result<Assembled, AssemblyError> {
		let Some(declaration) = self.declaration.clone() else {
			return Err(AssemblyError::MissingDeclaration);
		};
		self.run(&declaration, text, Vec::new())
	}

	/// Assembles a whole method, from its optional `signature` and `deprecated` lines over the `method` header
	/// to the closing `end`.
	///
	/// This declares the method of the header, so that later calls to [`Assembler::assemble`] assemble code for it.
	/// Line numbers of errors count from the start of `text`.
	pub fn assemble_source(&mut self, text: &str) -> Result<(MethodDefinition, Assembled), AssemblyError> {
		let lines: Vec<&str> = text.lines().collect();
		let mut errors = Vec::new();
		let mut signature = None;
		let mut deprecated = false;

		let mut header = None;
		for (index, line) in lines.iter().enumerate() {
			if is_skipped(line) {
				continue;
			}
			let trimmed = line.trim();
			let (keyword, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
			if keyword.eq_ignore_ascii_case("signature") {
				if rest.trim().is_empty() {
					errors.push(LineError::new(line_number(index), LineErrorKind::UnfinishedAssembler {
						mnemonic: "SIGNATURE".to_owned(),
						error: ParseError::new(trimmed, "missing signature"),
					}));
				} else {
					signature = Some(rest.trim().to_owned());
				}
			} else if keyword.eq_ignore_ascii_case("deprecated") && rest.is_empty() {
				deprecated = true;
			} else if keyword.eq_ignore_ascii_case("annotation") || keyword.eq_ignore_ascii_case("invisible-annotation") {
				warn!("ignoring annotation on line {}, annotations can't be assembled", line_number(index));
			} else {
				header = Some(index);
				break;
			}
		}

		let header = header.ok_or(AssemblyError::MissingDeclaration)?;
		let mut declaration = match MethodDefinition::parse_header(lines[header]) {
			Ok(declaration) => declaration,
			Err(error) => {
				errors.push(LineError::new(line_number(header), LineErrorKind::UnfinishedAssembler {
					mnemonic: "METHOD".to_owned(),
					error,
				}));
				self.enter(State::Failed);
				return Err(AssemblyError::Failed(Box::new(AssemblyFailure { errors, partial: Vec::new() })));
			},
		};
		declaration.signature = signature;
		declaration.deprecated = deprecated;

		let end = lines.iter()
			.enumerate()
			.skip(header + 1)
			.find(|(_, line)| line.trim().eq_ignore_ascii_case("end"))
			.map(|(index, _)| index);
		match end {
			Some(end) => {
				if lines[end + 1..].iter().any(|line| !is_skipped(line)) {
					warn!("ignoring text after the `end` of method {}", declaration.name);
				}
			},
			None => errors.push(LineError::unattributed(LineErrorKind::UnfinishedAssembler {
				mnemonic: "METHOD".to_owned(),
				error: ParseError::new(lines[header].trim(), "missing `end`"),
			})),
		}
		let end = end.unwrap_or(lines.len());

		// keep the lines outside the body as blank lines, so that line numbers stay the same
		let body: Vec<&str> = lines.iter()
			.enumerate()
			.map(|(index, line)| if index > header && index < end { *line } else { "" })
			.collect();

		self.declare(declaration.clone());
		let assembled = self.run(&declaration, &body.join("\n"), errors)?;
		Ok((declaration, assembled))
	}

	fn run(&mut self, declaration: &MethodDefinition, text: &str, mut errors: Vec<LineError>) -> Result<Assembled, AssemblyError> {
		debug!("assembling method {}{}", declaration.name, declaration.desc());

		let mut labels = LabelTable::new();
		let mut variables = VariableTable::new();
		let is_static = declaration.modifiers.contains(Modifier::Static);
		let parameters = declaration.parameters.iter()
			.map(|parameter| (parameter.name.as_str(), category_of(&parameter.desc)));
		if let Err(e) = variables.setup(is_static, parameters) {
			errors.push(LineError::unattributed(e));
		}

		self.enter(State::Parsing);
		let mut aliases = AliasTable::new();
		let mut statements = Vec::new();
		for line in aliases.preprocess(text) {
			let text = match line.text {
				Ok(text) => text,
				Err(e) => {
					errors.push(LineError::new(line.line, e));
					continue;
				},
			};
			if is_skipped(&text) {
				continue;
			}
			let mut context = ParseContext { labels: &mut labels, variables: &mut variables };
			match parse_statement(&text, &mut context) {
				Ok(statement) => {
					trace!("line {}: {statement:?}", line.line);
					statements.push((line.line, statement));
				},
				Err(kind) => errors.push(LineError::new(line.line, kind)),
			}
		}

		self.enter(State::Resolving);
		let resolved = match resolve(&statements, &labels, &variables) {
			Ok(resolved) => Some(resolved),
			Err(resolve_errors) => {
				errors.extend(resolve_errors);
				None
			},
		};
		let resolved = match resolved {
			Some(resolved) if errors.is_empty() => resolved,
			_ => return Err(self.fail(errors, statements)),
		};

		let (method, line_index) = self.build(declaration, resolved, &labels, &variables);

		if self.options.verify {
			self.enter(State::Verifying);
			if let Err(error) = verifier::verify(&method, self.options.max_verifier_iterations) {
				let line = error.index.and_then(|index| line_index.get(index).copied().flatten());
				debug!("verification failed at entry {:?} (line {line:?}): {error}", error.index);
				errors.push(LineError { line, kind: error.into() });
				return Err(self.fail(errors, statements));
			}
		}

		self.enter(State::Done);
		Ok(Assembled { method, line_index })
	}

	fn fail(&mut self, mut errors: Vec<LineError>, partial: Vec<(u32, Statement)>) -> AssemblyError {
		errors.sort_by_key(LineError::line_number);
		self.enter(State::Failed);
		AssemblyError::Failed(Box::new(AssemblyFailure { errors, partial }))
	}

	fn build(&self, declaration: &MethodDefinition, resolved: Resolved, labels: &LabelTable, variables: &VariableTable) -> (Method, Vec<Option<u32>>) {
		let Resolved { mut instructions, mut line_index, exception_table, exceptions } = resolved;

		let local_variables = if self.options.generate_locals {
			instructions.insert(0, InstructionListEntry::Label(labels.start()));
			line_index.insert(0, None);
			instructions.push(InstructionListEntry::Label(labels.end()));
			line_index.push(None);
			Some(self.local_variables(declaration, labels, variables))
		} else {
			None
		};

		let mut method = Method::new(MethodAccess::from(declaration.modifiers.value()), declaration.name.clone(), declaration.descriptor());
		method.has_deprecated_attribute = declaration.deprecated;
		method.signature = declaration.signature.as_deref()
			.and_then(|signature| MethodSignature::try_from(signature).ok());

		let thrown: Vec<ClassName> = declaration.throws.iter()
			.map(|thrown| thrown.0.clone())
			.chain(exceptions)
			.collect();
		method.exceptions = (!thrown.is_empty()).then_some(thrown);

		method.code = Some(Code {
			max_stack: Some(MAX_STACK),
			max_locals: Some(variables.max_locals()),
			instructions,
			exception_table,
			local_variables,
		});
		(method, line_index)
	}

	fn local_variables(&self, declaration: &MethodDefinition, labels: &LabelTable, variables: &VariableTable) -> Vec<Lv> {
		variables.entries()
			.filter_map(|(name, slot, category)| {
				let Ok(lv_name) = LocalVariableName::try_from(name) else {
					warn!("not emitting local variable {name:?}, it's not a valid local variable name");
					return None;
				};
				let descriptor = if name == "this" {
					self.options.host_type.as_ref().map(|host| host.to_descriptor())
				} else {
					declaration.parameters.iter()
						.find(|parameter| parameter.name == name)
						.map(|parameter| parameter.desc.clone())
				};
				let descriptor = descriptor.or_else(|| FieldDescriptor::try_from(category.default_descriptor()).ok());
				Some(Lv {
					range: LabelRange { start: labels.start(), end: labels.end() },
					name: lv_name,
					descriptor,
					signature: None,
					index: LvIndex { index: slot },
				})
			})
			.collect()
	}
}

fn line_number(index: usize) -> u32 {
	u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use duke::tree::method::code::{Instruction, InstructionListEntry, LvIndex};
	use duke::tree::method::MethodAccess;
	use crate::assembler::{Assembler, AssemblerOptions, State, MAX_STACK};
	use crate::error::{AssemblyError, LineErrorKind};

	fn static_access() -> MethodAccess {
		MethodAccess { is_static: true, ..MethodAccess::default() }
	}

	#[test]
	fn missing_declaration() {
		let mut assembler = Assembler::new(AssemblerOptions::default());
		assert_eq!(assembler.assemble("RETURN"), Err(AssemblyError::MissingDeclaration));
		assert_eq!(assembler.state(), State::Unstarted);
	}

	#[test]
	fn states() -> Result<()> {
		let mut assembler = Assembler::new(AssemblerOptions::default());
		assembler.declare_method(static_access(), "run", "()V")?;
		assert_eq!(assembler.state(), State::Declared);
		assembler.assemble("RETURN")?;
		assert_eq!(assembler.state(), State::Done);
		assert!(assembler.assemble("NOPE").is_err());
		assert_eq!(assembler.state(), State::Failed);
		Ok(())
	}

	#[test]
	fn comments_and_blank_lines() -> Result<()> {
		let mut assembler = Assembler::new(AssemblerOptions::default());
		assembler.declare_method(static_access(), "get", "(J)J")?;
		let assembled = assembler.assemble("// load it\n\n   LLOAD 0\n\t// and return\nLRETURN\n")?;
		let code = assembled.method.code.as_ref().unwrap();
		assert_eq!(code.instructions, vec![
			InstructionListEntry::Instruction(Instruction::LLoad(LvIndex { index: 0 })),
			InstructionListEntry::Instruction(Instruction::LReturn),
		]);
		assert_eq!(code.max_stack, Some(MAX_STACK));
		assert_eq!(code.max_locals, Some(2));
		assert_eq!(assembled.line_index, vec![Some(3), Some(5)]);
		assert_eq!(assembled.line_of(1), Some(5));
		assert_eq!(assembled.line_of(2), None);
		Ok(())
	}

	#[test]
	fn source_with_header() -> Result<()> {
		let mut assembler = Assembler::new(AssemblerOptions { generate_locals: true, ..AssemblerOptions::default() });
		let (definition, assembled) = assembler.assemble_source("\
			signature <T:Ljava/lang/Object;>(TT;)V\n\
			deprecated\n\
			method public static consume(Ljava/lang/Object; value)V\n\
			throws java/io/IOException\n\
			ALOAD value\n\
			ASTORE copy\n\
			RETURN\n\
			end")?;
		assert_eq!(definition.name.as_inner(), "consume");
		let method = assembled.method;
		assert!(method.has_deprecated_attribute);
		assert_eq!(method.signature.as_ref().map(|x| x.as_inner()), Some("<T:Ljava/lang/Object;>(TT;)V"));
		assert_eq!(method.exceptions.as_ref().map(Vec::len), Some(1));

		let code = method.code.unwrap();
		assert_eq!(code.max_locals, Some(2));
		let locals = code.local_variables.unwrap();
		let names: Vec<_> = locals.iter().map(|lv| (lv.name.as_inner(), lv.index.index)).collect();
		assert_eq!(names, vec![("value", 0), ("copy", 1)]);
		assert_eq!(locals[1].descriptor.as_ref().map(|x| x.as_inner()), Some("Ljava/lang/Object;"));
		assert_eq!(assembled.line_index.first(), Some(&None));
		assert_eq!(assembled.line_index[1], Some(5));
		Ok(())
	}

	#[test]
	fn source_errors_count_whole_text() {
		let mut assembler = Assembler::new(AssemblerOptions::default());
		let error = assembler.assemble_source("\n// a method\nmethod static f()V\nBIPUSH\nRETURN\nend").unwrap_err();
		let pairs: Vec<_> = error.errors().iter().map(|e| e.line_number()).collect();
		assert_eq!(pairs, vec![4]);
		assert!(matches!(error.errors()[0].kind, LineErrorKind::UnfinishedAssembler { .. }));

		let error = assembler.assemble_source("method static f()V\nRETURN").unwrap_err();
		assert_eq!(error.errors()[0].line_number(), -1);

		assert_eq!(assembler.assemble_source("// nothing"), Err(AssemblyError::MissingDeclaration));
	}
}
