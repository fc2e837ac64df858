//! The naming pass: labels and local variable slots get the names the emitted text uses.

use std::collections::HashMap;
use log::trace;
use duke::tree::descriptor::Type;
use duke::tree::method::code::{Code, Instruction, InstructionListEntry, Label, Lv};
use crate::assembler::parser::is_valid_symbol;
use crate::assembler::variables::{Category, VariableTable};
use crate::opcode::Opcode;

/// The name of the `index`th generated label: `A` to `Z`, then `AA`, `AB` and so on.
///
/// ```
/// use dukeasm::disassembler::naming::label_name;
/// assert_eq!(label_name(0), "A");
/// assert_eq!(label_name(25), "Z");
/// assert_eq!(label_name(26), "AA");
/// assert_eq!(label_name(27 * 26), "AAA");
/// ```
pub fn label_name(index: usize) -> String {
	let mut chars = Vec::new();
	let mut n = index + 1;
	while n > 0 {
		n -= 1;
		chars.push(char::from(b'A' + (n % 26) as u8));
		n /= 26;
	}
	chars.iter().rev().collect()
}

/// All labels that an entry declares or refers to, in the order they appear in its text.
fn labels_of(entry: &InstructionListEntry) -> Vec<Label> {
	match entry {
		InstructionListEntry::Label(label) => vec![*label],
		InstructionListEntry::LineNumber { start, .. } => vec![*start],
		InstructionListEntry::Instruction(instruction) => match instruction {
			Instruction::IfEq(label) | Instruction::IfNe(label) | Instruction::IfLt(label) |
			Instruction::IfGe(label) | Instruction::IfGt(label) | Instruction::IfLe(label) |
			Instruction::IfICmpEq(label) | Instruction::IfICmpNe(label) | Instruction::IfICmpLt(label) |
			Instruction::IfICmpGe(label) | Instruction::IfICmpGt(label) | Instruction::IfICmpLe(label) |
			Instruction::IfACmpEq(label) | Instruction::IfACmpNe(label) |
			Instruction::Goto(label) | Instruction::Jsr(label) |
			Instruction::IfNull(label) | Instruction::IfNonNull(label) => vec![*label],
			Instruction::TableSwitch { default, table, .. } =>
				table.iter().chain(std::iter::once(default)).copied().collect(),
			Instruction::LookupSwitch { default, pairs } =>
				pairs.iter().map(|(_, label)| label).chain(std::iter::once(default)).copied().collect(),
			_ => Vec::new(),
		},
	}
}

/// Names every label of some code.
///
/// The labels of the exception table come first: the ones of the first block are named `EX_START`, `EX_END` and
/// `EX_HANDLER`, the ones of block `i` get a `_i` suffix. A label shared by several blocks keeps its first name.
/// All other labels are named by [`label_name`], in the order they first appear in the instruction list.
pub fn name_labels(code: &Code) -> HashMap<Label, String> {
	let mut names = HashMap::new();

	for (i, exception) in code.exception_table.iter().enumerate() {
		let suffix = if i == 0 { String::new() } else { format!("_{i}") };
		for (label, prefix) in [(exception.start, "EX_START"), (exception.end, "EX_END"), (exception.handler, "EX_HANDLER")] {
			names.entry(label).or_insert_with(|| format!("{prefix}{suffix}"));
		}
	}

	let mut generated = 0;
	for label in code.instructions.iter().flat_map(labels_of) {
		names.entry(label).or_insert_with(|| {
			let name = label_name(generated);
			generated += 1;
			trace!("named label {} {name:?}", label.id());
			name
		});
	}

	names
}

/// The names of local variable slots, chosen so that assembling the emitted text binds each name to the same slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableNames {
	pub parameters: Vec<String>,
	slots: HashMap<u16, String>,
}

impl VariableNames {
	/// The name of a slot, which is the slot number if it has no other name.
	pub fn get(&self, slot: u16) -> String {
		self.slots.get(&slot).cloned().unwrap_or_else(|| slot.to_string())
	}
}

/// The name the local variable table gives some slot, if it can be used in text.
fn debug_name(local_variables: &[Lv], slot: u16) -> Option<&str> {
	local_variables.iter()
		.filter(|lv| lv.index.index == slot)
		.map(|lv| lv.name.as_inner())
		.find(|name| is_valid_symbol(name) && !name.bytes().all(|b| b.is_ascii_digit()))
}

/// Names the parameters and the local variable slots of a method.
///
/// A name from the local variable table is only taken if the assembler would give that name the same slot again,
/// which it does only when the slot is the next free one at the first use of the name. Other slots are named by
/// their number. Slot `0` of a non static method is `this`.
pub fn name_variables(is_static: bool, parameters: &[Type], code: Option<&Code>) -> VariableNames {
	let local_variables = code.and_then(|code| code.local_variables.as_deref()).unwrap_or(&[]);

	let mut names = VariableNames::default();
	let mut slot = 0u16;
	if !is_static {
		names.slots.insert(0, "this".to_owned());
		slot = 1;
	}
	for parameter in parameters {
		let name = debug_name(local_variables, slot)
			.filter(|name| !names.slots.values().any(|x| x == name))
			.map_or_else(|| slot.to_string(), str::to_owned);
		names.slots.insert(slot, name.clone());
		names.parameters.push(name);
		slot = slot.saturating_add(parameter.size());
	}

	let Some(code) = code else {
		return names;
	};

	let mut table = VariableTable::new();
	let declared = parameters.iter()
		.zip(&names.parameters)
		.map(|(parameter, name)| (name.as_str(), Category::of(parameter)));
	if table.setup(is_static, declared).is_err() {
		return names;
	}

	for instruction in code.real_instructions() {
		let (opcode, slot) = match instruction {
			Instruction::ILoad(lv) | Instruction::LLoad(lv) | Instruction::FLoad(lv) | Instruction::DLoad(lv) |
			Instruction::ALoad(lv) | Instruction::IStore(lv) | Instruction::LStore(lv) | Instruction::FStore(lv) |
			Instruction::DStore(lv) | Instruction::AStore(lv) | Instruction::Ret(lv) |
			Instruction::IInc(lv, _) => (Opcode::of(instruction), lv.index),
			_ => continue,
		};
		let Some(category) = opcode.variable_category() else {
			continue;
		};
		if names.slots.contains_key(&slot) {
			// a conflict here also fails when assembling, under any name
			if let Err(e) = table.register(&names.get(slot), category) {
				trace!("slot {slot} is used as {category} again: {e}");
			}
			continue;
		}

		let name = debug_name(local_variables, slot)
			.filter(|name| table.get(name).is_err() && table.next_slot() == slot)
			.map_or_else(|| slot.to_string(), str::to_owned);
		if let Err(e) = table.register(&name, category) {
			trace!("slot {slot} is used as {category} again: {e}");
		}
		trace!("named slot {slot} {name:?}");
		names.slots.insert(slot, name);
	}

	names
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::tree::descriptor::Type;
	use duke::tree::method::code::{Code, Exception, Instruction, InstructionListEntry, Label, LabelRange, Lv, LvIndex};
	use crate::disassembler::naming::{label_name, name_labels, name_variables};

	#[test]
	fn generated_label_names() {
		let names: Vec<_> = [0, 1, 25, 26, 27, 51, 52, 701, 702].into_iter().map(label_name).collect();
		assert_eq!(names, ["A", "B", "Z", "AA", "AB", "AZ", "BA", "ZZ", "AAA"]);
	}

	#[test]
	fn labels_in_order_of_appearance() {
		let (a, b, c, d) = (Label::new(10), Label::new(11), Label::new(12), Label::new(13));
		let code = Code {
			instructions: vec![
				InstructionListEntry::Label(c),
				InstructionListEntry::Instruction(Instruction::Goto(a)),
				InstructionListEntry::Label(d),
				InstructionListEntry::Label(a),
				InstructionListEntry::Instruction(Instruction::IfNull(b)),
				InstructionListEntry::Label(b),
			],
			..Code::default()
		};
		let names = name_labels(&code);
		assert_eq!(names[&c], "A");
		assert_eq!(names[&a], "B");
		assert_eq!(names[&d], "C");
		assert_eq!(names[&b], "D");
	}

	#[test]
	fn exception_labels() {
		let labels: Vec<_> = (0..6).map(Label::new).collect();
		let code = Code {
			instructions: labels.iter().map(|x| InstructionListEntry::Label(*x)).collect(),
			exception_table: vec![
				Exception { start: labels[1], end: labels[2], handler: labels[3], catch: None },
				Exception { start: labels[1], end: labels[2], handler: labels[4], catch: None },
			],
			..Code::default()
		};
		let names = name_labels(&code);
		assert_eq!(names[&labels[0]], "A");
		assert_eq!(names[&labels[1]], "EX_START");
		assert_eq!(names[&labels[2]], "EX_END");
		assert_eq!(names[&labels[3]], "EX_HANDLER");
		assert_eq!(names[&labels[4]], "EX_HANDLER_1");
		assert_eq!(names[&labels[5]], "B");
	}

	fn lv(name: &str, index: u16) -> Lv {
		Lv {
			range: LabelRange { start: Label::new(0), end: Label::new(1) },
			name: name.parse().unwrap(),
			descriptor: None,
			signature: None,
			index: LvIndex { index },
		}
	}

	#[test]
	fn variables() {
		let code = Code {
			instructions: vec![
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 2 })),
				InstructionListEntry::Instruction(Instruction::AStore(LvIndex { index: 1 })),
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 3 })),
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 4 })),
				InstructionListEntry::Instruction(Instruction::ILoad(LvIndex { index: 0 })),
			],
			local_variables: Some(vec![lv("count", 0), lv("late", 2), lv("text", 1), lv("count", 3), lv("ok", 4)]),
			..Code::default()
		};
		let names = name_variables(true, &[Type::I], Some(&code));
		assert_eq!(names.parameters, ["count"]);
		// Slot 2 is used before slot 1, so naming it would move it to slot 1.
		assert_eq!(names.get(2), "2");
		assert_eq!(names.get(1), "1");
		assert_eq!(names.get(3), "3");
		assert_eq!(names.get(4), "ok");
		assert_eq!(names.get(9), "9");

		let names = name_variables(false, &[Type::J, Type::I], None);
		assert_eq!(names.get(0), "this");
		assert_eq!(names.parameters, ["1", "3"]);
	}

	#[test]
	fn slots_reused_with_other_categories() {
		let code = Code {
			instructions: vec![
				InstructionListEntry::Instruction(Instruction::LStore(LvIndex { index: 0 })),
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 1 })),
				InstructionListEntry::Instruction(Instruction::FStore(LvIndex { index: 0 })),
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 2 })),
			],
			local_variables: Some(vec![lv("wide", 0), lv("after", 2)]),
			..Code::default()
		};
		let names = name_variables(true, &[], Some(&code));
		assert_eq!(names.get(0), "wide");
		assert_eq!(names.get(1), "1");
		assert_eq!(names.get(2), "after");
	}

	#[test]
	fn named_locals() {
		let code = Code {
			instructions: vec![
				InstructionListEntry::Instruction(Instruction::IStore(LvIndex { index: 1 })),
				InstructionListEntry::Instruction(Instruction::DStore(LvIndex { index: 2 })),
				InstructionListEntry::Instruction(Instruction::AStore(LvIndex { index: 4 })),
			],
			local_variables: Some(vec![lv("i", 1), lv("d", 2), lv("s", 4)]),
			..Code::default()
		};
		let names = name_variables(true, &[Type::I], Some(&code));
		assert_eq!(names.parameters, ["0"]);
		assert_eq!(names.get(1), "i");
		assert_eq!(names.get(2), "d");
		assert_eq!(names.get(4), "s");
	}
}
