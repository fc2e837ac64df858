use std::collections::{HashMap, VecDeque};
use log::trace;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use duke::tree::descriptor::Type;
use duke::tree::method::code::{Code, Instruction, InstructionListEntry, Label};
use crate::error::{VerifyError, VerifyErrorKind};
use crate::verifier::frame::Frame;

/// How the frame at the end of an edge is derived from the frame of the entry the edge starts at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Edge {
	/// Normal control flow, with the frame after executing the entry.
	Flow,
	/// The return from a subroutine, with the frame before the `JSR`.
	SubroutineReturn,
	/// The jump to an exception handler, with the locals before the entry and the exception on the stack.
	Exception,
}

/// The control flow graph of some code.
///
/// There's one node for each entry of the instruction list, holding its index. An additional last node stands
/// for the end of the code, and any edge into it means that execution can fall off the end.
pub(crate) struct ControlFlow {
	graph: DiGraph<usize, Edge>,
	nodes: Vec<NodeIndex>,
	end: NodeIndex,
}

fn error(index: Option<usize>, kind: VerifyErrorKind) -> VerifyError {
	VerifyError { index, kind }
}

impl ControlFlow {
	pub(crate) fn build(code: &Code) -> Result<ControlFlow, VerifyError> {
		let entries = &code.instructions;
		let mut graph = DiGraph::with_capacity(entries.len() + 1, entries.len() + 1);
		let nodes: Vec<NodeIndex> = (0..entries.len()).map(|index| graph.add_node(index)).collect();
		let end = graph.add_node(entries.len());

		let positions: HashMap<Label, usize> = entries.iter()
			.enumerate()
			.filter_map(|(index, entry)| match entry {
				InstructionListEntry::Label(label) => Some((*label, index)),
				_ => None,
			})
			.collect();
		let node_of = |label: &Label, at: Option<usize>| -> Result<NodeIndex, VerifyError> {
			positions.get(label)
				.map(|&index| nodes[index])
				.ok_or_else(|| error(at, VerifyErrorKind::UndeclaredLabel(label.id())))
		};
		let next = |index: usize| nodes.get(index + 1).copied().unwrap_or(end);

		for (index, entry) in entries.iter().enumerate() {
			let node = nodes[index];
			let InstructionListEntry::Instruction(instruction) = entry else {
				graph.add_edge(node, next(index), Edge::Flow);
				continue;
			};
			match instruction {
				Instruction::Goto(label) => {
					graph.add_edge(node, node_of(label, Some(index))?, Edge::Flow);
				},
				Instruction::Jsr(label) => {
					graph.add_edge(node, node_of(label, Some(index))?, Edge::Flow);
					graph.add_edge(node, next(index), Edge::SubroutineReturn);
				},
				Instruction::IfEq(label) | Instruction::IfNe(label) | Instruction::IfLt(label) |
				Instruction::IfGe(label) | Instruction::IfGt(label) | Instruction::IfLe(label) |
				Instruction::IfICmpEq(label) | Instruction::IfICmpNe(label) | Instruction::IfICmpLt(label) |
				Instruction::IfICmpGe(label) | Instruction::IfICmpGt(label) | Instruction::IfICmpLe(label) |
				Instruction::IfACmpEq(label) | Instruction::IfACmpNe(label) |
				Instruction::IfNull(label) | Instruction::IfNonNull(label) => {
					graph.add_edge(node, node_of(label, Some(index))?, Edge::Flow);
					graph.add_edge(node, next(index), Edge::Flow);
				},
				Instruction::TableSwitch { default, table, .. } => {
					for label in table.iter().chain(std::iter::once(default)) {
						graph.add_edge(node, node_of(label, Some(index))?, Edge::Flow);
					}
				},
				Instruction::LookupSwitch { default, pairs } => {
					for label in pairs.iter().map(|(_, label)| label).chain(std::iter::once(default)) {
						graph.add_edge(node, node_of(label, Some(index))?, Edge::Flow);
					}
				},
				Instruction::IReturn | Instruction::LReturn | Instruction::FReturn | Instruction::DReturn |
				Instruction::AReturn | Instruction::Return | Instruction::AThrow | Instruction::Ret(_) => {},
				_ => {
					graph.add_edge(node, next(index), Edge::Flow);
				},
			}
		}

		for exception in &code.exception_table {
			let start = positions.get(&exception.start).copied();
			let end = positions.get(&exception.end).copied();
			let (Some(start), Some(end)) = (start, end) else {
				let missing = if start.is_none() { exception.start } else { exception.end };
				return Err(error(None, VerifyErrorKind::UndeclaredLabel(missing.id())));
			};
			let handler = node_of(&exception.handler, None)?;
			for index in start..end {
				if matches!(entries[index], InstructionListEntry::Instruction(_)) {
					graph.add_edge(nodes[index], handler, Edge::Exception);
				}
			}
		}

		Ok(ControlFlow { graph, nodes, end })
	}

	/// Runs the data flow analysis from the initial frame, until no frame changes anymore.
	pub(crate) fn analyze(&self, code: &Code, initial: Frame, return_type: Option<&Type>, max_iterations: usize) -> Result<Vec<Option<Frame>>, VerifyError> {
		let mut frames: Vec<Option<Frame>> = vec![None; self.nodes.len()];
		let Some(&first) = self.nodes.first() else {
			return Err(error(None, VerifyErrorKind::FallOffEnd));
		};
		frames[0] = Some(initial);

		let mut worklist = VecDeque::from([first]);
		let mut iterations = 0;
		while let Some(node) = worklist.pop_front() {
			iterations += 1;
			if iterations > max_iterations {
				return Err(error(None, VerifyErrorKind::IterationLimit(max_iterations)));
			}

			let index = self.graph[node];
			let Some(before) = frames[index].clone() else {
				continue;
			};
			let mut after = before.clone();
			if let InstructionListEntry::Instruction(instruction) = &code.instructions[index] {
				after.execute(instruction, return_type)
					.map_err(|kind| error(Some(index), kind))?;
			}

			for edge in self.graph.edges(node) {
				if edge.target() == self.end {
					return Err(error(None, VerifyErrorKind::FallOffEnd));
				}
				let incoming = match edge.weight() {
					Edge::Flow => after.clone(),
					Edge::SubroutineReturn => before.clone(),
					Edge::Exception => before.for_handler(),
				};
				let target = self.graph[edge.target()];
				let changed = match &mut frames[target] {
					Some(existing) => existing.merge(&incoming)
						.map_err(|kind| error(Some(target), kind))?,
					slot @ None => {
						*slot = Some(incoming);
						true
					},
				};
				if changed && !worklist.contains(&edge.target()) {
					trace!("frame of entry {target} changed");
					worklist.push_back(edge.target());
				}
			}
		}

		Ok(frames)
	}
}
