use anyhow::Result;
use pretty_assertions::assert_eq;
use duke::tree::method::code::{Instruction, InstructionListEntry, Label};
use duke::tree::method::{Method, MethodAccess};
use duke_macros::{method_descriptor, method_name};
use dukeasm::assembler::{Assembler, AssemblerOptions};
use dukeasm::ast::Print;
use dukeasm::disassembler::Disassembler;

fn assemble_source(text: &str) -> Result<Method> {
	let mut assembler = Assembler::new(AssemblerOptions::default());
	let (_, assembled) = assembler.assemble_source(text)?;
	Ok(assembled.method)
}

#[test]
fn classify() -> Result<()> {
	let input = include_str!("classify.jasm");
	let expected = include_str!("classify_disassembled.jasm");

	let assembled = assemble_source(input)?;
	let actual = Disassembler::method(&assembled)?.print_plain();
	assert_eq!(actual, expected.trim_end(), "left: actual, right: expected");

	// the disassembled text assembles to the same method, and disassembles to the same text again
	let reassembled = assemble_source(&actual)?;
	assert_eq!(reassembled, assembled);
	assert_eq!(Disassembler::method(&reassembled)?.print_plain(), actual);

	Ok(())
}

#[test]
fn printing_is_idempotent() -> Result<()> {
	let method = assemble_source(include_str!("classify.jasm"))?;
	let definition = Disassembler::method(&method)?;
	assert_eq!(definition.print_plain(), definition.print_plain());
	assert_eq!(definition.print(&dukeasm::ast::Ansi), definition.print(&dukeasm::ast::Ansi));
	Ok(())
}

#[test]
fn labels_are_named_in_order_of_appearance() -> Result<()> {
	let (a, b, c, d) = (Label::new(4), Label::new(2), Label::new(5), Label::new(3));
	let mut method = Method::new(
		MethodAccess { is_static: true, ..MethodAccess::default() },
		method_name!("jumps").to_owned(),
		method_descriptor!("(I)V").to_owned(),
	);
	method.code = Some(duke::tree::method::code::Code {
		instructions: vec![
			InstructionListEntry::Label(c),
			InstructionListEntry::Instruction(Instruction::ILoad(duke::tree::method::code::LvIndex { index: 0 })),
			InstructionListEntry::Instruction(Instruction::IfEq(a)),
			InstructionListEntry::Label(d),
			InstructionListEntry::Instruction(Instruction::Goto(b)),
			InstructionListEntry::Label(a),
			InstructionListEntry::Instruction(Instruction::Goto(c)),
			InstructionListEntry::Label(b),
			InstructionListEntry::Instruction(Instruction::Return),
		],
		..Default::default()
	});

	let text = Disassembler::method(&method)?.print_plain();
	assert_eq!(text, "\
		method static jumps(I 0)V\n\
		LABEL A\n\
		ILOAD 0\n\
		IFEQ B\n\
		LABEL C\n\
		GOTO D\n\
		LABEL B\n\
		GOTO A\n\
		LABEL D\n\
		RETURN\n\
		end");

	// same shape, with fresh label identities
	let reassembled = assemble_source(&text)?;
	let disassembled_again = Disassembler::method(&reassembled)?.print_plain();
	assert_eq!(disassembled_again, text);
	Ok(())
}
