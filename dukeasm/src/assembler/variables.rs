use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use indexmap::IndexMap;
use log::trace;
use duke::tree::descriptor::Type;
use crate::error::VariableError;

/// The kind of value a local variable slot holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
	Object,
	Int,
	Float,
	Long,
	Double,
}

impl Category {
	/// The number of slots a variable of this category takes.
	pub fn width(self) -> u16 {
		match self {
			Category::Long | Category::Double => 2,
			_ => 1,
		}
	}

	/// The category of a value of some type. Booleans, bytes, chars and shorts are ints.
	pub fn of(t: &Type) -> Category {
		match t {
			Type::B | Type::C | Type::I | Type::S | Type::Z => Category::Int,
			Type::F => Category::Float,
			Type::J => Category::Long,
			Type::D => Category::Double,
			Type::Object(_) | Type::Array(_, _) => Category::Object,
		}
	}

	/// The descriptor used for generated local variable entries.
	pub fn default_descriptor(self) -> &'static str {
		match self {
			Category::Object => "Ljava/lang/Object;",
			Category::Int => "I",
			Category::Float => "F",
			Category::Long => "J",
			Category::Double => "D",
		}
	}
}

impl Display for Category {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Category::Object => "object",
			Category::Int => "int",
			Category::Float => "float",
			Category::Long => "long",
			Category::Double => "double",
		})
	}
}

/// Maps variable names to local variable slots for the assembly of one method.
///
/// Names made only of digits are slot numbers and address that slot directly. Other names get the next free
/// slot on first use. A slot keeps the category it was first used with, and the second slot of a long or double
/// can't be used on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
	names: IndexMap<String, u16>,
	categories: BTreeMap<u16, Category>,
	/// The second slots of longs and doubles.
	upper_halves: BTreeMap<u16, Category>,
	next: u16,
	max: u16,
}

fn is_slot_number(name: &str) -> bool {
	!name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

impl VariableTable {
	pub fn new() -> VariableTable {
		VariableTable::default()
	}

	/// Registers `this` (for non static methods) and the parameters, in order.
	///
	/// A parameter named by a slot number must be named by the slot it's passed in.
	pub fn setup<'a>(&mut self, is_static: bool, parameters: impl IntoIterator<Item=(&'a str, Category)>) -> Result<(), VariableError> {
		*self = VariableTable::new();
		if !is_static {
			self.register("this", Category::Object)?;
		}
		for (name, category) in parameters {
			if is_slot_number(name) && name.parse::<u16>().ok() != Some(self.next) {
				return Err(VariableError::ParameterSlot { name: name.to_owned(), slot: self.next });
			}
			self.register(name, category)?;
		}
		Ok(())
	}

	/// Gets the slot of a variable, allocating one if the name is new.
	pub fn register(&mut self, name: &str, category: Category) -> Result<u16, VariableError> {
		let slot = if let Some(&slot) = self.names.get(name) {
			slot
		} else if is_slot_number(name) {
			name.parse().map_err(|_| VariableError::SlotOutOfRange(name.to_owned()))?
		} else {
			self.next
		};

		let end = slot.checked_add(category.width())
			.ok_or_else(|| VariableError::SlotOutOfRange(name.to_owned()))?;

		let conflict = |slot: u16, bound: Category| VariableError::TypeConflict {
			name: name.to_owned(),
			slot,
			bound,
			requested: category,
		};
		if let Some(&bound) = self.upper_halves.get(&slot) {
			return Err(conflict(slot, bound));
		}
		match self.categories.get(&slot) {
			Some(&bound) if bound != category => return Err(conflict(slot, bound)),
			Some(_) => {},
			None => {
				if category.width() == 2 {
					if let Some(&bound) = self.categories.get(&(slot + 1)) {
						return Err(conflict(slot + 1, bound));
					}
					self.upper_halves.insert(slot + 1, category);
				}
				trace!("bound variable {name:?} to slot {slot} as {category}");
				self.categories.insert(slot, category);
			},
		}

		if !self.names.contains_key(name) {
			self.names.insert(name.to_owned(), slot);
		}
		self.next = self.next.max(end);
		self.max = self.max.max(end);
		Ok(slot)
	}

	/// Gets the slot of a known variable.
	pub fn get(&self, name: &str) -> Result<u16, VariableError> {
		self.names.get(name)
			.copied()
			.ok_or_else(|| VariableError::Unresolved(name.to_owned()))
	}

	pub fn category(&self, slot: u16) -> Option<Category> {
		self.categories.get(&slot).copied()
	}

	/// The number of slots used, counting the second slot of longs and doubles.
	pub fn max_locals(&self) -> u16 {
		self.max
	}

	/// The slot the next new name gets.
	pub fn next_slot(&self) -> u16 {
		self.next
	}

	/// All the names with their slot and category, in order of registration.
	pub fn entries(&self) -> impl Iterator<Item=(&str, u16, Category)> + '_ {
		self.names.iter()
			.filter_map(|(name, &slot)| Some((name.as_str(), slot, self.category(slot)?)))
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::assembler::variables::{Category, VariableTable};
	use crate::error::VariableError;

	#[test]
	fn setup_instance_method() {
		let mut variables = VariableTable::new();
		variables.setup(false, [("a", Category::Long), ("b", Category::Object)]).unwrap();
		assert_eq!(variables.get("this"), Ok(0));
		assert_eq!(variables.get("a"), Ok(1));
		assert_eq!(variables.get("b"), Ok(3));
		assert_eq!(variables.max_locals(), 4);

		assert_eq!(variables.register("c", Category::Int), Ok(4));
		assert_eq!(variables.register("c", Category::Int), Ok(4));
		assert_eq!(variables.max_locals(), 5);
	}

	#[test]
	fn slot_numbers() {
		let mut variables = VariableTable::new();
		variables.setup(true, [("0", Category::Int), ("1", Category::Int)]).unwrap();
		assert_eq!(variables.register("1", Category::Int), Ok(1));
		assert_eq!(variables.register("7", Category::Double), Ok(7));
		assert_eq!(variables.max_locals(), 9);
		assert_eq!(variables.register("x", Category::Float), Ok(9));
		assert!(matches!(variables.register("99999", Category::Int), Err(VariableError::SlotOutOfRange(_))));
	}

	#[test]
	fn conflicting_categories() {
		let mut variables = VariableTable::new();
		variables.setup(false, []).unwrap();
		assert_eq!(variables.register("x", Category::Int), Ok(1));
		let error = variables.register("x", Category::Object).unwrap_err();
		assert_eq!(error, VariableError::TypeConflict {
			name: "x".to_owned(),
			slot: 1,
			bound: Category::Int,
			requested: Category::Object,
		});
		assert!(error.to_string().contains("int"));
		assert!(error.to_string().contains("object"));

		// slot numbers are checked against the names on the same slot
		assert!(variables.register("0", Category::Int).is_err());
		assert!(variables.register("this", Category::Float).is_err());
	}

	#[test]
	fn second_slot_of_wide_values() {
		let mut variables = VariableTable::new();
		variables.setup(true, []).unwrap();
		assert_eq!(variables.register("x", Category::Long), Ok(0));
		assert_eq!(variables.register("1", Category::Int), Err(VariableError::TypeConflict {
			name: "1".to_owned(),
			slot: 1,
			bound: Category::Long,
			requested: Category::Int,
		}));
		assert!(variables.register("1", Category::Long).is_err());

		assert_eq!(variables.register("3", Category::Float), Ok(3));
		assert_eq!(variables.register("2", Category::Double), Err(VariableError::TypeConflict {
			name: "2".to_owned(),
			slot: 3,
			bound: Category::Float,
			requested: Category::Double,
		}));
		assert_eq!(variables.register("x", Category::Long), Ok(0));
	}

	#[test]
	fn parameters_named_by_slot() {
		let mut variables = VariableTable::new();
		assert_eq!(variables.setup(true, [("0", Category::Long), ("2", Category::Int)]), Ok(()));
		assert_eq!(variables.setup(false, [("1", Category::Int), ("x", Category::Int), ("3", Category::Object)]), Ok(()));
		assert_eq!(
			variables.setup(true, [("0", Category::Long), ("1", Category::Int)]),
			Err(VariableError::ParameterSlot { name: "1".to_owned(), slot: 2 }),
		);
		assert_eq!(
			variables.setup(true, [("5", Category::Int)]),
			Err(VariableError::ParameterSlot { name: "5".to_owned(), slot: 0 }),
		);
	}

	#[test]
	fn entries_in_order() {
		let mut variables = VariableTable::new();
		variables.setup(false, [("s", Category::Object)]).unwrap();
		variables.register("d", Category::Double).unwrap();
		let entries: Vec<_> = variables.entries().collect();
		assert_eq!(entries, vec![
			("this", 0, Category::Object),
			("s", 1, Category::Object),
			("d", 2, Category::Double),
		]);
	}
}
