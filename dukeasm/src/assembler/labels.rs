use indexmap::IndexMap;
use log::trace;
use duke::tree::method::code::Label;
use crate::error::LabelError;

#[derive(Debug, Clone, PartialEq)]
struct Entry {
	label: Label,
	declared: bool,
}

/// Maps label names to [`Label`]s for the assembly of one method.
///
/// Names are registered as they're seen, by declarations and by references alike, so a jump may name a label that's
/// only declared further down.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
	names: IndexMap<String, Entry>,
	start: Label,
	end: Label,
	next_id: u16,
}

impl Default for LabelTable {
	fn default() -> Self {
		LabelTable::new()
	}
}

impl LabelTable {
	pub fn new() -> LabelTable {
		LabelTable {
			names: IndexMap::new(),
			start: Label::new(0),
			end: Label::new(1),
			next_id: 2,
		}
	}

	/// Forgets all names, and creates the two labels marking the start and end of the method body.
	pub fn reset(&mut self) {
		*self = LabelTable::new();
	}

	/// The label at the very start of the method body.
	pub fn start(&self) -> Label {
		self.start
	}

	/// The label at the very end of the method body.
	pub fn end(&self) -> Label {
		self.end
	}

	/// Registers a name, creating a new label only if the name wasn't seen before.
	pub fn register(&mut self, name: &str) -> Result<Label, LabelError> {
		if let Some(entry) = self.names.get(name) {
			return Ok(entry.label);
		}
		let label = Label::new(self.next_id);
		self.next_id = self.next_id.checked_add(1).ok_or(LabelError::TooMany)?;
		trace!("registered label {name:?} as {}", label.id());
		self.names.insert(name.to_owned(), Entry { label, declared: false });
		Ok(label)
	}

	/// Registers a name and marks it as declared by a label statement.
	pub fn declare(&mut self, name: &str) -> Result<Label, LabelError> {
		let label = self.register(name)?;
		let entry = self.names.get_mut(name).ok_or_else(|| LabelError::Unresolved(name.to_owned()))?;
		if entry.declared {
			return Err(LabelError::Duplicate(name.to_owned()));
		}
		entry.declared = true;
		Ok(label)
	}

	/// Gets the label of a registered name.
	pub fn get(&self, name: &str) -> Result<Label, LabelError> {
		self.names.get(name)
			.map(|entry| entry.label)
			.ok_or_else(|| LabelError::Unresolved(name.to_owned()))
	}

	/// Gets the label of a name that's also declared somewhere.
	pub fn resolve(&self, name: &str) -> Result<Label, LabelError> {
		match self.names.get(name) {
			Some(entry) if entry.declared => Ok(entry.label),
			_ => Err(LabelError::Unresolved(name.to_owned())),
		}
	}

	/// The number of named labels.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}
