use duke::tree::class::ClassName;
use duke::tree::module::{ModuleName, PackageName};
use duke::tree::version::Version;
use crate::ast::{join_line, print_definition_prefix, Definition, Print, PrintContext};
use crate::ast::annotation::Annotation;
use crate::ast::field::FieldDefinition;
use crate::ast::method::MethodDefinition;
use crate::ast::modifier::Modifiers;
use crate::text::escape;

/// An `innerclass <inner> <outer> <name> <modifiers>` entry, with `*` for an absent outer class or name.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassDefinition {
	pub inner: ClassName,
	pub outer: Option<ClassName>,
	pub inner_name: Option<String>,
	pub modifiers: Modifiers,
}

impl Print for InnerClassDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		join_line(context, "innerclass", &[
			context.name(self.inner.as_inner()),
			context.name(self.outer.as_ref().map_or("*", |x| x.as_inner())),
			context.name(self.inner_name.as_deref().unwrap_or("*")),
			self.modifiers.print(context),
		])
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequiresDefinition {
	pub name: ModuleName,
	pub modifiers: Modifiers,
	pub version: Option<String>,
}

/// An `exports` or `opens` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDefinition {
	pub name: PackageName,
	pub modifiers: Modifiers,
	pub to: Vec<ModuleName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProvidesDefinition {
	pub service: ClassName,
	pub with: Vec<ClassName>,
}

/// The module of a `module-info` class.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefinition {
	pub name: ModuleName,
	pub modifiers: Modifiers,
	pub version: Option<String>,
	pub requires: Vec<RequiresDefinition>,
	pub exports: Vec<PackageDefinition>,
	pub opens: Vec<PackageDefinition>,
	pub uses: Vec<ClassName>,
	pub provides: Vec<ProvidesDefinition>,
}

fn version_part(context: &dyn PrintContext, version: &Option<String>) -> String {
	version.as_ref()
		.map(|v| format!("{} {}", context.keyword("version"), context.literal(&format!("\"{}\"", escape(v)))))
		.unwrap_or_default()
}

fn names<T: AsRef<str>>(context: &dyn PrintContext, names: &[T]) -> String {
	names.iter().map(|x| context.name(x.as_ref())).collect::<Vec<_>>().join(", ")
}

impl Print for ModuleDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mut lines = vec![join_line(context, "module", &[
			context.name(self.name.as_inner()),
			self.modifiers.print(context),
			version_part(context, &self.version),
		])];
		for requires in &self.requires {
			lines.push(join_line(context, "\trequires", &[
				context.name(requires.name.as_inner()),
				requires.modifiers.print(context),
				version_part(context, &requires.version),
			]));
		}
		for (keyword, packages) in [("\texports", &self.exports), ("\topens", &self.opens)] {
			for package in packages {
				let to = if package.to.is_empty() {
					String::new()
				} else {
					format!("{} {}", context.keyword("to"), names(context, &package.to))
				};
				lines.push(join_line(context, keyword, &[
					context.name(package.name.as_inner()),
					package.modifiers.print(context),
					to,
				]));
			}
		}
		for uses in &self.uses {
			lines.push(join_line(context, "\tuses", &[context.name(uses.as_inner())]));
		}
		for provides in &self.provides {
			lines.push(join_line(context, "\tprovides", &[
				context.name(provides.service.as_inner()),
				context.keyword("with"),
				names(context, &provides.with),
			]));
		}
		lines.push(context.keyword("end"));
		lines.join("\n")
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordComponentDefinition {
	pub name: String,
	pub descriptor: String,
	pub signature: Option<String>,
	pub annotations: Vec<Annotation>,
}

/// The components of a record class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDefinition {
	pub components: Vec<RecordComponentDefinition>,
}

impl Print for RecordDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mut lines = vec![context.keyword("record")];
		for component in &self.components {
			for annotation in &component.annotations {
				lines.push(format!("\t{}", annotation.print(context)));
			}
			let signature = component.signature.as_ref()
				.map(|s| format!("{} {}", context.keyword("signature"), context.literal(s)))
				.unwrap_or_default();
			lines.push(join_line(context, "\tcomponent", &[
				context.name(&component.name),
				context.name(&component.descriptor),
				signature,
			]));
		}
		lines.push(context.keyword("end"));
		lines.join("\n")
	}
}

/// A class with its members.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
	pub version: Option<Version>,
	pub modifiers: Modifiers,
	pub annotations: Vec<Annotation>,
	pub signature: Option<String>,
	pub deprecated: bool,
	pub name: ClassName,
	pub super_type: Option<ClassName>,
	pub interfaces: Vec<ClassName>,
	pub source_file: Option<String>,
	pub nest_host: Option<ClassName>,
	pub nest_members: Vec<ClassName>,
	pub permitted_subclasses: Vec<ClassName>,
	pub inner_classes: Vec<InnerClassDefinition>,
	pub module: Option<ModuleDefinition>,
	pub record: Option<RecordDefinition>,
	pub fields: Vec<FieldDefinition>,
	pub methods: Vec<MethodDefinition>,
}

impl ClassDefinition {
	pub fn new(modifiers: Modifiers, name: ClassName) -> ClassDefinition {
		ClassDefinition {
			version: None,
			modifiers,
			annotations: Vec::new(),
			signature: None,
			deprecated: false,
			name,
			super_type: None,
			interfaces: Vec::new(),
			source_file: None,
			nest_host: None,
			nest_members: Vec::new(),
			permitted_subclasses: Vec::new(),
			inner_classes: Vec::new(),
			module: None,
			record: None,
			fields: Vec::new(),
			methods: Vec::new(),
		}
	}
}

impl Definition for ClassDefinition {
	fn name(&self) -> &str {
		self.name.as_inner()
	}

	fn modifiers(&self) -> &Modifiers {
		&self.modifiers
	}

	fn annotations(&self) -> &[Annotation] {
		&self.annotations
	}

	fn signature(&self) -> Option<&str> {
		self.signature.as_deref()
	}

	fn is_deprecated(&self) -> bool {
		self.deprecated
	}

	fn is_class(&self) -> bool {
		true
	}

	fn desc(&self) -> String {
		format!("L{};", self.name.as_inner())
	}
}

impl Print for ClassDefinition {
	fn print(&self, context: &dyn PrintContext) -> String {
		let mut out = String::new();
		let mut line = |s: String| {
			out.push_str(&s);
			out.push('\n');
		};

		if let Some(version) = self.version {
			line(join_line(context, "version", &[context.literal(&version.to_string())]));
		}
		if let Some(source_file) = &self.source_file {
			line(join_line(context, "sourcefile", &[context.literal(&format!("\"{}\"", escape(source_file)))]));
		}
		if let Some(nest_host) = &self.nest_host {
			line(join_line(context, "nesthost", &[context.name(nest_host.as_inner())]));
		}
		for permitted in &self.permitted_subclasses {
			line(join_line(context, "permittedsubclass", &[context.name(permitted.as_inner())]));
		}
		for member in &self.nest_members {
			line(join_line(context, "nestmember", &[context.name(member.as_inner())]));
		}
		for inner_class in &self.inner_classes {
			line(inner_class.print(context));
		}
		if let Some(module) = &self.module {
			line(module.print(context));
		}
		if let Some(record) = &self.record {
			line(record.print(context));
		}

		let mut prefix = String::new();
		print_definition_prefix(self, context, &mut prefix);
		out.push_str(&prefix);

		let mut line = |s: String| {
			out.push_str(&s);
			out.push('\n');
		};
		line(join_line(context, "class", &[self.modifiers.print(context), context.name(self.name.as_inner())]));
		if let Some(super_type) = &self.super_type {
			line(join_line(context, "extends", &[context.name(super_type.as_inner())]));
		}
		for interface in &self.interfaces {
			line(join_line(context, "implements", &[context.name(interface.as_inner())]));
		}

		out.push('\n');
		for field in &self.fields {
			out.push_str(&field.print(context));
			out.push('\n');
		}
		out.push('\n');
		let methods: Vec<_> = self.methods.iter().map(|method| method.print(context)).collect();
		out.push_str(&methods.join("\n\n"));
		out
	}
}
