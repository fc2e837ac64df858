use anyhow::Result;
use pretty_assertions::assert_eq;
use duke::tree::method::MethodAccess;
use dukeasm::assembler::{Assembler, AssemblerOptions};
use dukeasm::error::{AssemblyError, LineErrorKind, VerifyErrorKind};

fn assemble(descriptor: &str, text: &str) -> Result<Result<(), AssemblyError>> {
	let mut assembler = Assembler::new(AssemblerOptions::default());
	assembler.declare_method(MethodAccess { is_static: true, ..MethodAccess::default() }, "test", descriptor)?;
	Ok(assembler.assemble(text).map(|_| ()))
}

fn verify_error(error: &AssemblyError) -> (i64, &VerifyErrorKind) {
	match error.errors() {
		[error] => match &error.kind {
			LineErrorKind::Verification(verify) => (error.line_number(), &verify.kind),
			kind => panic!("expected a verification error, got {kind:?}"),
		},
		errors => panic!("expected exactly one error, got {errors:?}"),
	}
}

#[test]
fn add() -> Result<()> {
	let mut assembler = Assembler::new(AssemblerOptions::default());
	assembler.declare_method(MethodAccess { is_static: true, ..MethodAccess::default() }, "add", "(II)I")?;
	let assembled = assembler.assemble("ILOAD 0\nILOAD 1\nIADD\nIRETURN")?;
	let max_locals = assembled.method.code.as_ref().and_then(|code| code.max_locals);
	assert!(max_locals >= Some(2), "{max_locals:?}");

	let error = assembler.assemble("ILOAD 0\nILOAD 1\nIADD\nARETURN").unwrap_err();
	let (line, kind) = verify_error(&error);
	assert_eq!(line, 4);
	assert!(matches!(kind, VerifyErrorKind::TypeMismatch { .. }), "{kind:?}");
	assert!(error.errors()[0].kind.to_string().starts_with("Verification failed: "));
	Ok(())
}

#[test]
fn unattributed_failures() -> Result<()> {
	let error = assemble("()V", "NOP")?.unwrap_err();
	assert_eq!(verify_error(&error), (-1, &VerifyErrorKind::FallOffEnd));
	assert_eq!(error.errors()[0].to_pair(), (-1, "Verification failed: execution can fall off the end of the code".to_owned()));
	Ok(())
}

#[test]
fn return_types() -> Result<()> {
	let error = assemble("()V", "ACONST_NULL\nARETURN")?.unwrap_err();
	assert_eq!(verify_error(&error), (2, &VerifyErrorKind::ReturnTypeMismatch {
		instruction: "ARETURN",
		return_type: "V".to_owned(),
	}));
	assert_eq!(error.errors()[0].to_pair().1, "Verification failed: ARETURN doesn't match the return type V of the method");

	let error = assemble("()J", "ICONST_0\nIRETURN")?.unwrap_err();
	assert!(matches!(verify_error(&error), (2, VerifyErrorKind::ReturnTypeMismatch { instruction: "IRETURN", .. })));
	Ok(())
}

#[test]
fn stack_underflow() -> Result<()> {
	let error = assemble("()V", "// nothing to pop\nPOP\nRETURN")?.unwrap_err();
	assert_eq!(verify_error(&error), (2, &VerifyErrorKind::StackUnderflow));
	Ok(())
}

#[test]
fn merge_points() -> Result<()> {
	let error = assemble("(I)V", "\
		ILOAD 0\n\
		IFEQ skip\n\
		ICONST_1\n\
		skip:\n\
		RETURN")?.unwrap_err();
	assert_eq!(verify_error(&error), (4, &VerifyErrorKind::StackHeightMismatch { expected: 0, found: 1 }));
	Ok(())
}

#[test]
fn declared_parameter_types() -> Result<()> {
	let error = assemble("(J)V", "ILOAD 0\nPOP\nRETURN")?.unwrap_err();
	assert!(matches!(error.errors()[0].kind, LineErrorKind::Variable(_)), "{:?}", error.errors());

	assert_eq!(assemble("(J)V", "LLOAD 0\nPOP2\nRETURN")?, Ok(()));
	Ok(())
}

#[test]
fn verification_can_be_disabled() -> Result<()> {
	let mut assembler = Assembler::new(AssemblerOptions { verify: false, ..AssemblerOptions::default() });
	assembler.declare_method(MethodAccess { is_static: true, ..MethodAccess::default() }, "test", "()V")?;
	let assembled = assembler.assemble("POP")?;
	assert_eq!(assembled.line_index, vec![Some(1)]);
	Ok(())
}
