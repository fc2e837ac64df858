//! Turning class file trees back into syntax nodes.
//!
//! Method bodies go through two passes. The naming pass ([`naming`]) names every label and local variable slot,
//! and the emission pass turns each entry of the instruction list into a [`Statement`] using these names.
//! Printing the result gives text the assembler accepts, which assembles to the same instructions again.

mod emit;
pub mod naming;

use log::debug;
use duke::tree::class::ClassFile;
use duke::tree::descriptor::ParsedFieldDescriptor;
use duke::tree::field::{ConstantValue, Field};
use duke::tree::method::Method;
use duke::tree::module::Module;
use duke::tree::record::RecordComponent;
use crate::ast::annotation::Annotation;
use crate::ast::class::{ClassDefinition, InnerClassDefinition, ModuleDefinition, PackageDefinition, ProvidesDefinition, RecordComponentDefinition, RecordDefinition, RequiresDefinition};
use crate::ast::code::{Code, Statement, ThrownException};
use crate::ast::field::{ConstVal, FieldDefinition};
use crate::ast::method::{MethodDefinition, MethodParameter};
use crate::ast::modifier::{ModifierTarget, Modifiers};
use crate::disassembler::emit::Emitter;
use crate::disassembler::naming::{name_labels, name_variables};
use crate::error::DisassemblyError;
use crate::text::escape;

/// Disassembles classes, fields and methods. It holds no state, every call stands on its own.
#[derive(Debug, Copy, Clone, Default)]
pub struct Disassembler;

impl Disassembler {
	/// Disassembles a method, with its body if it has one.
	///
	/// ```
	/// use duke::tree::method::{Method, MethodAccess};
	/// use duke::tree::method::code::{Code, Instruction, InstructionListEntry, LvIndex};
	/// use dukeasm::ast::Print;
	/// use dukeasm::disassembler::Disassembler;
	///
	/// let mut method = Method::new(MethodAccess { is_public: true, ..MethodAccess::default() }, "id".parse().unwrap(), "(I)I".parse().unwrap());
	/// method.code = Some(Code {
	/// 	instructions: vec![
	/// 		InstructionListEntry::Instruction(Instruction::ILoad(LvIndex { index: 1 })),
	/// 		InstructionListEntry::Instruction(Instruction::IReturn),
	/// 	],
	/// 	..Code::default()
	/// });
	///
	/// let definition = Disassembler::method(&method).unwrap();
	/// assert_eq!(definition.print_plain(), "method public id(I 1)I\nILOAD 1\nIRETURN\nend");
	/// ```
	pub fn method(method: &Method) -> Result<MethodDefinition, DisassemblyError> {
		let descriptor = method.descriptor.parse()
			.map_err(|source| DisassemblyError::Descriptor {
				descriptor: method.descriptor.as_inner().to_owned(),
				source,
			})?;

		let variables = name_variables(method.access.is_static, &descriptor.parameter_descriptors, method.code.as_ref());
		let parameters = descriptor.parameter_descriptors.iter()
			.zip(&variables.parameters)
			.map(|(parameter, name)| MethodParameter {
				desc: ParsedFieldDescriptor(parameter.clone()).write(),
				name: name.clone(),
			})
			.collect();
		let return_type = descriptor.return_descriptor.map(|x| ParsedFieldDescriptor(x).write());

		let mut definition = MethodDefinition::new(
			Modifiers::from_flags(method.access.into(), ModifierTarget::Method),
			method.name.clone(),
			parameters,
			return_type,
		);
		definition.annotations = Annotation::all_from_duke(&method.runtime_visible_annotations, &method.runtime_invisible_annotations);
		definition.signature = method.signature.as_ref().map(|x| x.as_inner().to_owned());
		definition.deprecated = method.has_deprecated_attribute;
		definition.throws = method.exceptions.iter()
			.flatten()
			.map(|class| ThrownException(class.clone()))
			.collect();

		if let Some(code) = &method.code {
			let labels = name_labels(code);
			let emitter = Emitter { labels: &labels, variables: &variables };
			let statements: Vec<Statement> = emitter.code(code);
			debug!("disassembled {}{} into {} statements", method.name, method.descriptor, statements.len());
			definition.code = Some(Code { statements });
		}

		Ok(definition)
	}

	pub fn field(field: &Field) -> FieldDefinition {
		let mut definition = FieldDefinition::new(
			Modifiers::from_flags(field.access.into(), ModifierTarget::Field),
			field.name.clone(),
			field.descriptor.clone(),
		);
		definition.annotations = Annotation::all_from_duke(&field.runtime_visible_annotations, &field.runtime_invisible_annotations);
		definition.signature = field.signature.as_ref().map(|x| x.as_inner().to_owned());
		definition.deprecated = field.has_deprecated_attribute;
		definition.constant_value = field.constant_value.as_ref().map(|value| match value {
			ConstantValue::Integer(x) => ConstVal::Int(*x),
			ConstantValue::Float(x) => ConstVal::Float(*x),
			ConstantValue::Long(x) => ConstVal::Long(*x),
			ConstantValue::Double(x) => ConstVal::Double(*x),
			ConstantValue::String(s) => ConstVal::String(escape(s)),
		});
		definition
	}

	/// Disassembles a class with all its fields and methods.
	pub fn class(class: &ClassFile) -> Result<ClassDefinition, DisassemblyError> {
		let mut definition = ClassDefinition::new(Modifiers::from_flags(class.access.into(), ModifierTarget::Class), class.name.clone());
		definition.version = Some(class.version);
		definition.annotations = Annotation::all_from_duke(&class.runtime_visible_annotations, &class.runtime_invisible_annotations);
		definition.signature = class.signature.as_ref().map(|x| x.as_inner().to_owned());
		definition.deprecated = class.has_deprecated_attribute;
		definition.super_type = class.super_class.clone();
		definition.interfaces = class.interfaces.clone();
		definition.source_file = class.source_file.clone();
		definition.nest_host = class.nest_host_class.clone();
		definition.nest_members = class.nest_members.clone().unwrap_or_default();
		definition.permitted_subclasses = class.permitted_subclasses.clone().unwrap_or_default();
		definition.inner_classes = class.inner_classes.iter()
			.flatten()
			.map(|inner| InnerClassDefinition {
				inner: inner.inner_class.clone(),
				outer: inner.outer_class.clone(),
				inner_name: inner.inner_name.clone(),
				modifiers: Modifiers::from_flags(inner.flags.into(), ModifierTarget::InnerClass),
			})
			.collect();
		definition.module = class.module.as_ref().map(module);
		definition.record = class.record_components.as_ref().map(|components| RecordDefinition {
			components: components.iter().map(record_component).collect(),
		});
		definition.fields = class.fields.iter().map(Disassembler::field).collect();
		definition.methods = class.methods.iter()
			.map(Disassembler::method)
			.collect::<Result<_, _>>()?;
		Ok(definition)
	}
}

fn module(module: &Module) -> ModuleDefinition {
	ModuleDefinition {
		name: module.name.clone(),
		modifiers: Modifiers::from_flags(module.flags.into(), ModifierTarget::Module),
		version: module.version.clone(),
		requires: module.requires.iter()
			.map(|requires| RequiresDefinition {
				name: requires.name.clone(),
				modifiers: Modifiers::from_flags(requires.flags.into(), ModifierTarget::Requires),
				version: requires.version.clone(),
			})
			.collect(),
		exports: module.exports.iter()
			.map(|exports| PackageDefinition {
				name: exports.name.clone(),
				modifiers: Modifiers::from_flags(exports.flags.into(), ModifierTarget::Package),
				to: exports.exports_to.clone(),
			})
			.collect(),
		opens: module.opens.iter()
			.map(|opens| PackageDefinition {
				name: opens.name.clone(),
				modifiers: Modifiers::from_flags(opens.flags.into(), ModifierTarget::Package),
				to: opens.opens_to.clone(),
			})
			.collect(),
		uses: module.uses.clone(),
		provides: module.provides.iter()
			.map(|provides| ProvidesDefinition {
				service: provides.name.clone(),
				with: provides.provides_with.clone(),
			})
			.collect(),
	}
}

fn record_component(component: &RecordComponent) -> RecordComponentDefinition {
	RecordComponentDefinition {
		name: component.name.as_inner().to_owned(),
		descriptor: component.descriptor.as_inner().to_owned(),
		signature: component.signature.as_ref().map(|x| x.as_inner().to_owned()),
		annotations: Annotation::all_from_duke(&component.runtime_visible_annotations, &component.runtime_invisible_annotations),
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use duke::tree::class::{ClassAccess, ClassFile, ClassName};
	use duke::tree::field::{ConstantValue, Field, FieldAccess};
	use duke::tree::method::code::{Code, Exception, Instruction, InstructionListEntry, Label, LabelRange, Lv, LvIndex};
	use duke::tree::method::{Method, MethodAccess};
	use duke::tree::version::Version;
	use duke_macros::{class_name, field_descriptor, field_name, method_descriptor, method_name};
	use crate::ast::Print;
	use crate::disassembler::Disassembler;

	#[test]
	fn method_with_handlers() {
		let (start, end, handler, after) = (Label::new(7), Label::new(3), Label::new(5), Label::new(1));
		let mut method = Method::new(
			MethodAccess { is_public: true, is_static: true, ..MethodAccess::default() },
			method_name!("run").to_owned(),
			method_descriptor!("(Ljava/lang/String;J)V").to_owned(),
		);
		method.exceptions = Some(vec![class_name!("java/io/IOException").to_owned()]);
		method.code = Some(Code {
			instructions: vec![
				InstructionListEntry::Label(start),
				InstructionListEntry::LineNumber { line: 12, start },
				InstructionListEntry::Instruction(Instruction::ALoad(LvIndex { index: 0 })),
				InstructionListEntry::Instruction(Instruction::IfNull(after)),
				InstructionListEntry::Instruction(Instruction::LLoad(LvIndex { index: 1 })),
				InstructionListEntry::Instruction(Instruction::LStore(LvIndex { index: 3 })),
				InstructionListEntry::Label(end),
				InstructionListEntry::Label(after),
				InstructionListEntry::Instruction(Instruction::Return),
				InstructionListEntry::Label(handler),
				InstructionListEntry::Instruction(Instruction::AThrow),
			],
			exception_table: vec![Exception { start, end, handler, catch: None }],
			local_variables: Some(vec![
				Lv {
					range: LabelRange { start, end },
					name: "text".parse().unwrap(),
					descriptor: None,
					signature: None,
					index: LvIndex { index: 0 },
				},
				Lv {
					range: LabelRange { start, end },
					name: "copy".parse().unwrap(),
					descriptor: None,
					signature: None,
					index: LvIndex { index: 3 },
				},
			]),
			..Code::default()
		});

		let definition = Disassembler::method(&method).unwrap();
		assert_eq!(definition.print_plain(), "\
			method public static run(Ljava/lang/String; text, J 1)V\n\
			throws java/io/IOException\n\
			try EX_START EX_END catch(*) EX_HANDLER\n\
			LABEL EX_START\n\
			LINE EX_START 12\n\
			ALOAD text\n\
			IFNULL A\n\
			LLOAD 1\n\
			LSTORE copy\n\
			LABEL EX_END\n\
			LABEL A\n\
			RETURN\n\
			LABEL EX_HANDLER\n\
			ATHROW\n\
			end");
	}

	#[test]
	fn abstract_method() {
		let method = Method::new(
			MethodAccess { is_public: true, is_abstract: true, ..MethodAccess::default() },
			method_name!("size").to_owned(),
			method_descriptor!("()I").to_owned(),
		);
		let definition = Disassembler::method(&method).unwrap();
		assert_eq!(definition.code, None);
		assert_eq!(definition.print_plain(), "method public abstract size()I\nend");
	}

	#[test]
	fn class_with_members() {
		let mut field = Field::new(
			FieldAccess { is_public: true, is_static: true, is_final: true, ..FieldAccess::default() },
			field_name!("NAME").to_owned(),
			field_descriptor!("Ljava/lang/String;").to_owned(),
		);
		field.constant_value = Some(ConstantValue::String("a\tb".to_owned()));
		let field_definition = Disassembler::field(&field);
		assert_eq!(field_definition.print_plain(), "field public static final NAME Ljava/lang/String; = \"a\\tb\"");

		let mut class = ClassFile::new(
			Version::V17,
			ClassAccess { is_public: true, is_super: true, ..ClassAccess::default() },
			ClassName::try_from("a/Named").unwrap(),
			Some(ClassName::JAVA_LANG_OBJECT.to_owned()),
			Vec::new(),
		);
		class.fields.push(field);
		class.methods.push(Method::new(
			MethodAccess { is_abstract: true, ..MethodAccess::default() },
			method_name!("name").to_owned(),
			method_descriptor!("()Ljava/lang/String;").to_owned(),
		));

		let definition = Disassembler::class(&class).unwrap();
		assert_eq!(definition.name, class.name);
		assert_eq!(definition.version, Some(Version::V17));
		assert_eq!(definition.fields, vec![field_definition]);
		assert_eq!(definition.methods.len(), 1);
		assert_eq!(definition.methods[0].return_type.as_ref().map(|x| x.as_inner()), Some("Ljava/lang/String;"));
	}
}
