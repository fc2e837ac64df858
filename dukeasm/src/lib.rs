//! A textual assembler and disassembler for the code of JVM methods, built on the tree model of `duke`.
//!
//! - [`ast`] holds the syntax nodes and their canonical printing,
//! - [`assembler`] turns text into [`duke::tree::method::Method`]s, reporting every failing line at once,
//! - [`disassembler`] turns methods, fields and classes back into syntax nodes,
//! - [`verifier`] checks the stack and local variable slots of assembled code.
//!
//! ```
//! use dukeasm::assembler::{Assembler, AssemblerOptions};
//! use duke::tree::method::MethodAccess;
//!
//! let mut assembler = Assembler::new(AssemblerOptions::default());
//! assembler.declare_method(MethodAccess { is_static: true, ..MethodAccess::default() }, "add", "(II)I").unwrap();
//!
//! let assembled = assembler.assemble("ILOAD 0\nILOAD 1\nIADD\nIRETURN").unwrap();
//! assert_eq!(assembled.method.code.unwrap().max_locals, Some(2));
//! ```

pub mod ast;
pub mod assembler;
pub mod disassembler;
pub mod error;
pub mod opcode;
pub mod text;
pub mod verifier;
