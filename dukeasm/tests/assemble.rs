use anyhow::Result;
use pretty_assertions::assert_eq;
use duke::tree::method::code::{Instruction, InstructionListEntry, Loadable, LvIndex};
use duke::tree::method::MethodAccess;
use dukeasm::assembler::{Assembler, AssemblerOptions, MAX_STACK};
use dukeasm::ast::code::{InstructionNode, Statement};
use dukeasm::error::{AssemblyError, LineErrorKind, VariableError};
use dukeasm::opcode::Opcode;

fn assembler(descriptor: &str) -> Result<Assembler> {
	let mut assembler = Assembler::new(AssemblerOptions::default());
	assembler.declare_method(MethodAccess { is_static: true, ..MethodAccess::default() }, "test", descriptor)?;
	Ok(assembler)
}

#[test]
fn forward_labels() -> Result<()> {
	let assembled = assembler("()V")?.assemble("GOTO end\nLABEL end:\nRETURN")?;
	let code = assembled.method.code.unwrap();
	let (InstructionListEntry::Instruction(Instruction::Goto(target)), InstructionListEntry::Label(declared)) =
		(&code.instructions[0], &code.instructions[1]) else {
		panic!("unexpected instructions {:?}", code.instructions);
	};
	assert_eq!(target, declared);
	let labels = code.instructions.iter().filter(|entry| matches!(entry, InstructionListEntry::Label(_))).count();
	assert_eq!(labels, 1);
	Ok(())
}

#[test]
fn variable_category_conflict() -> Result<()> {
	let error = assembler("()V")?.assemble("ICONST_0\nISTORE x\nACONST_NULL\nASTORE x\nRETURN").unwrap_err();
	assert_eq!(error.errors().len(), 1);
	let error = &error.errors()[0];
	assert_eq!(error.line_number(), 4);
	assert!(matches!(error.kind, LineErrorKind::Variable(VariableError::TypeConflict { .. })));
	let message = error.kind.to_string();
	assert!(message.contains("int") && message.contains("object"), "{message}");
	Ok(())
}

#[test]
fn second_slot_of_a_long() -> Result<()> {
	let error = assembler("()V")?.assemble("LCONST_0\nLSTORE x\nICONST_0\nISTORE 1\nRETURN").unwrap_err();
	assert_eq!(error.errors().len(), 1);
	let error = &error.errors()[0];
	assert_eq!(error.line_number(), 4);
	assert!(matches!(&error.kind, LineErrorKind::Variable(VariableError::TypeConflict { slot: 1, .. })), "{:?}", error.kind);
	let message = error.kind.to_string();
	assert!(message.contains("long") && message.contains("int"), "{message}");
	Ok(())
}

#[test]
fn header_parameters() -> Result<()> {
	let mut assembler = Assembler::new(AssemblerOptions::default());
	let (declaration, _) = assembler.assemble_source("method static f(J 0, I 2)I\nILOAD 2\nIRETURN\nend")?;
	assert_eq!(declaration.parameters.len(), 2);

	for text in [
		// the int is passed in slot 2
		"method static f(J 0, I 1)I\nILOAD 1\nIRETURN\nend",
		"method static f(I 5)I\nILOAD 5\nIRETURN\nend",
		"method static f(I a b)I\nILOAD 0\nIRETURN\nend",
	] {
		let error = assembler.assemble_source(text).unwrap_err();
		let errors: Vec<_> = error.errors().iter().map(|e| e.line_number()).collect();
		assert_eq!(errors, vec![1], "{text}");
		assert!(matches!(&error.errors()[0].kind, LineErrorKind::UnfinishedAssembler { mnemonic, .. } if mnemonic == "METHOD"));
	}
	Ok(())
}

#[test]
fn all_errors_at_once() -> Result<()> {
	let error = assembler("()V")?.assemble("BIPUSH 127F\nFROB 1\nILOAD\nNOP").unwrap_err();
	let AssemblyError::Failed(failure) = error else {
		panic!("expected a failure, got {error:?}");
	};
	let lines: Vec<_> = failure.errors.iter().map(|e| e.line_number()).collect();
	assert_eq!(lines, vec![1, 2, 3]);
	assert_eq!(failure.errors[1].kind, LineErrorKind::MissingAssembler("FROB".to_owned()));
	assert!(matches!(&failure.errors[0].kind, LineErrorKind::UnfinishedAssembler { mnemonic, .. } if mnemonic == "BIPUSH"));
	assert!(matches!(&failure.errors[2].kind, LineErrorKind::UnfinishedAssembler { mnemonic, .. } if mnemonic == "ILOAD"));
	assert_eq!(failure.partial, vec![(4, Statement::Instruction(InstructionNode::Simple(Opcode::Nop)))]);
	Ok(())
}

#[test]
fn fixed_max_stack() -> Result<()> {
	let assembled = assembler("()V")?.assemble("RETURN")?;
	let code = assembled.method.code.unwrap();
	assert_eq!(code.max_stack, Some(MAX_STACK));
	assert_eq!(code.max_stack, Some(0xFF));
	assert_eq!(code.max_locals, Some(0));
	Ok(())
}

#[test]
fn aliases() -> Result<()> {
	let assembled = assembler("()Ljava/lang/String;")?.assemble("\
		alias greeting \"hello\"\n\
		alias message \"${greeting} there\"\n\
		LDC \"${message}\"\n\
		ARETURN")?;
	let code = assembled.method.code.unwrap();
	assert_eq!(code.instructions[0], InstructionListEntry::Instruction(Instruction::Ldc(Loadable::String("hello there".to_owned()))));
	assert_eq!(assembled.line_index, vec![Some(3), Some(4)]);

	let error = assembler("()V")?.assemble("LDC ${missing}\nRETURN").unwrap_err();
	assert_eq!(error.errors()[0].to_string(), "line 1: unknown alias: missing");
	Ok(())
}

#[test]
fn switches() -> Result<()> {
	let assembled = assembler("(I)I")?.assemble("\
		ILOAD 0\n\
		tableswitch range[1:2] labels[one, two] default[other]\n\
		one:\n\
		ILOAD 0\n\
		LOOKUPSWITCH mapping[5=two, -5=one] default[other]\n\
		two:\n\
		other:\n\
		ICONST_1\n\
		IRETURN")?;
	let code = assembled.method.code.unwrap();
	let Some(InstructionListEntry::Instruction(Instruction::LookupSwitch { pairs, .. })) = code.instructions.get(4) else {
		panic!("expected a lookup switch, got {:?}", code.instructions.get(4));
	};
	let keys: Vec<_> = pairs.iter().map(|(key, _)| *key).collect();
	assert_eq!(keys, vec![-5, 5]);

	// whitespace between a group's name and its bracket
	let spaced = assembler("(I)V")?.assemble("ILOAD 0\nTABLESWITCH range [0:1] labels [a, b] default [a]\na:\nb:\nRETURN")?;
	let code = spaced.method.code.unwrap();
	assert!(matches!(code.instructions.get(1), Some(InstructionListEntry::Instruction(Instruction::TableSwitch { .. }))), "{:?}", code.instructions);

	let mut failing = assembler("(I)V")?;
	for (text, line) in [
		("ILOAD 0\nTABLESWITCH range[0:2] labels[a, b] default[a]\na:\nb:\nRETURN", 2),
		("ILOAD 0\nLOOKUPSWITCH mapping[1=a, 1=a] default[a]\na:\nRETURN", 2),
		("ILOAD 0\nLOOKUPSWITCH mapping[1=a]\na:\nRETURN", 2),
	] {
		let error = failing.assemble(text).unwrap_err();
		assert_eq!(error.errors().iter().map(|e| e.line_number()).collect::<Vec<_>>(), vec![line], "{text}");
	}
	Ok(())
}

#[test]
fn generated_locals() -> Result<()> {
	let mut assembler = Assembler::new(AssemblerOptions {
		generate_locals: true,
		host_type: Some("a/Host".parse()?),
		..AssemblerOptions::default()
	});
	assembler.declare_method(MethodAccess::default(), "set", "(D)V")?;
	let assembled = assembler.assemble("DLOAD 1\nDSTORE copy\nRETURN")?;
	let code = assembled.method.code.unwrap();
	assert_eq!(code.max_locals, Some(5));
	let locals: Vec<_> = code.local_variables.unwrap().into_iter()
		.map(|lv| (lv.name.as_inner().to_owned(), lv.index, lv.descriptor.map(|x| x.as_inner().to_owned())))
		.collect();
	assert_eq!(locals, vec![
		("this".to_owned(), LvIndex { index: 0 }, Some("La/Host;".to_owned())),
		("1".to_owned(), LvIndex { index: 1 }, Some("D".to_owned())),
		("copy".to_owned(), LvIndex { index: 3 }, Some("D".to_owned())),
	]);
	Ok(())
}
