//! A data flow verifier for the code of a method.
//!
//! Each entry of the instruction list gets a [`Frame`] of abstract values. Starting from the parameters, frames are
//! propagated along the control flow graph and merged where paths meet, until nothing changes anymore. It checks
//! the types of values an instruction takes, the stack size, local variable indices, and that execution can't fall
//! off the end of the code.
//!
//! Subroutines (`JSR`/`RET`) are approximated: the instruction after a `JSR` continues with the frame from before it.

pub mod frame;
mod graph;

use log::debug;
use duke::tree::method::code::{Code, Instruction, LvIndex};
use duke::tree::method::Method;
use crate::error::{VerifyError, VerifyErrorKind};
use crate::verifier::frame::Frame;
use crate::verifier::graph::ControlFlow;

/// The number of local variable slots the instructions access, for code that doesn't say.
fn used_locals(method: &Method, code: &Code) -> u16 {
	let arguments = method.descriptor.get_arguments_size().unwrap_or(0)
		.saturating_add(if method.access.is_static { 0 } else { 1 });
	code.real_instructions()
		.filter_map(|instruction| match instruction {
			Instruction::LLoad(LvIndex { index }) | Instruction::DLoad(LvIndex { index }) |
			Instruction::LStore(LvIndex { index }) | Instruction::DStore(LvIndex { index }) => Some(index.saturating_add(2)),
			Instruction::ILoad(LvIndex { index }) | Instruction::FLoad(LvIndex { index }) | Instruction::ALoad(LvIndex { index }) |
			Instruction::IStore(LvIndex { index }) | Instruction::FStore(LvIndex { index }) | Instruction::AStore(LvIndex { index }) |
			Instruction::IInc(LvIndex { index }, _) | Instruction::Ret(LvIndex { index }) => Some(index.saturating_add(1)),
			_ => None,
		})
		.fold(arguments, u16::max)
}

/// Verifies the code of a method. Methods without code always pass.
///
/// The index of a returned error is the index into the instruction list of the failing entry. It's [`None`] if the
/// failure can't be attributed to a single entry, like for falling off the end of the code.
pub fn verify(method: &Method, max_iterations: usize) -> Result<(), VerifyError> {
	let Some(code) = &method.code else {
		return Ok(());
	};

	let descriptor = method.descriptor.parse()
		.map_err(|_| VerifyError {
			index: None,
			kind: VerifyErrorKind::InvalidDescriptor(method.descriptor.as_inner().to_owned()),
		})?;

	let max_locals = code.max_locals.unwrap_or_else(|| used_locals(method, code));
	let max_stack = code.max_stack.unwrap_or(u16::MAX);
	let initial = Frame::initial(method.access.is_static, &descriptor.parameter_descriptors, max_locals, max_stack)
		.map_err(|kind| VerifyError { index: None, kind })?;

	let graph = ControlFlow::build(code)?;
	let frames = graph.analyze(code, initial, descriptor.return_descriptor.as_ref(), max_iterations)?;
	debug!("verified {}{}: {} of {} entries reachable", method.name, method.descriptor,
		frames.iter().filter(|frame| frame.is_some()).count(), frames.len());
	Ok(())
}
