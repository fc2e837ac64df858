//! A model of the contents of java class files.
//!
//! The [`tree`] module holds a class file as plain data: a [`ClassFile`][tree::class::ClassFile] with its
//! [fields][tree::field::Field] and [methods][tree::method::Method], and for each method the
//! [code][tree::method::code::Code] as an index-addressable list of instructions.
//!
//! Names and descriptors are validated newtypes, see for example [`ClassName`][tree::class::ClassName].

pub mod tree;
mod macros;
