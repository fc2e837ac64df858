use std::fmt::{Display, Formatter};
use crate::ast::{Print, PrintContext};

/// A single access flag, by name.
///
/// Some bits mean different things depending on what they're applied to (`0x0020` is `synchronized` on methods,
/// `super` on classes, `open` on modules and `transitive` on requires), see [`ModifierTarget`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Modifier {
	Public,
	Private,
	Protected,
	Static,
	Final,
	Synchronized,
	Super,
	Open,
	Transitive,
	Bridge,
	Volatile,
	StaticPhase,
	Varargs,
	Transient,
	Native,
	Interface,
	Abstract,
	Strict,
	Synthetic,
	Annotation,
	Enum,
	Module,
	Mandated,
}

/// What a set of modifiers belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ModifierTarget {
	Class,
	Field,
	Method,
	InnerClass,
	Parameter,
	Module,
	Requires,
	/// An `exports` or `opens` entry.
	Package,
}

use Modifier as M;
use ModifierTarget as T;

/// The name and value of each modifier, in printing order.
const TABLE: &[(Modifier, &str, u16, &[ModifierTarget])] = &[
	(M::Public,       "public",       0x0001, &[T::Class, T::Field, T::Method, T::InnerClass]),
	(M::Private,      "private",      0x0002, &[T::Field, T::Method, T::InnerClass]),
	(M::Protected,    "protected",    0x0004, &[T::Field, T::Method, T::InnerClass]),
	(M::Static,       "static",       0x0008, &[T::Field, T::Method, T::InnerClass]),
	(M::Final,        "final",        0x0010, &[T::Class, T::Field, T::Method, T::InnerClass, T::Parameter]),
	(M::Synchronized, "synchronized", 0x0020, &[T::Method]),
	(M::Super,        "super",        0x0020, &[T::Class]),
	(M::Open,         "open",         0x0020, &[T::Module]),
	(M::Transitive,   "transitive",   0x0020, &[T::Requires]),
	(M::Bridge,       "bridge",       0x0040, &[T::Method]),
	(M::Volatile,     "volatile",     0x0040, &[T::Field]),
	(M::StaticPhase,  "static-phase", 0x0040, &[T::Requires]),
	(M::Varargs,      "varargs",      0x0080, &[T::Method]),
	(M::Transient,    "transient",    0x0080, &[T::Field]),
	(M::Native,       "native",       0x0100, &[T::Method]),
	(M::Interface,    "interface",    0x0200, &[T::Class, T::InnerClass]),
	(M::Abstract,     "abstract",     0x0400, &[T::Class, T::Method, T::InnerClass]),
	(M::Strict,       "strictfp",     0x0800, &[T::Method]),
	(M::Synthetic,    "synthetic",    0x1000, &[T::Class, T::Field, T::Method, T::InnerClass, T::Parameter, T::Module, T::Requires, T::Package]),
	(M::Annotation,   "annotation",   0x2000, &[T::Class, T::InnerClass]),
	(M::Enum,         "enum",         0x4000, &[T::Class, T::Field, T::InnerClass]),
	(M::Module,       "module",       0x8000, &[T::Class]),
	(M::Mandated,     "mandated",     0x8000, &[T::Parameter, T::Module, T::Requires, T::Package]),
];

impl Modifier {
	fn entry(self) -> &'static (Modifier, &'static str, u16, &'static [ModifierTarget]) {
		// every modifier has exactly one entry in the table
		&TABLE[TABLE.iter().position(|(m, ..)| *m == self).unwrap_or_default()]
	}

	pub fn name(self) -> &'static str {
		self.entry().1
	}

	/// The bit of this flag.
	pub fn value(self) -> u16 {
		self.entry().2
	}

	pub fn applies_to(self, target: ModifierTarget) -> bool {
		self.entry().3.contains(&target)
	}

	/// Looks a modifier up by its name, ignoring case.
	///
	/// ```
	/// use dukeasm::ast::modifier::Modifier;
	/// assert_eq!(Modifier::from_name("STATIC"), Some(Modifier::Static));
	/// assert_eq!(Modifier::from_name("static-phase"), Some(Modifier::StaticPhase));
	/// assert_eq!(Modifier::from_name("const"), None);
	/// ```
	pub fn from_name(name: &str) -> Option<Modifier> {
		TABLE.iter()
			.find(|(_, n, ..)| n.eq_ignore_ascii_case(name))
			.map(|(m, ..)| *m)
	}
}

impl Display for Modifier {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// An ordered set of modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(pub Vec<Modifier>);

impl Modifiers {
	/// The bitwise or of all the flags.
	pub fn value(&self) -> u16 {
		self.0.iter().fold(0, |acc, m| acc | m.value())
	}

	pub fn contains(&self, modifier: Modifier) -> bool {
		self.0.contains(&modifier)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Gets the modifiers that make up `flags`, when applied to `target`.
	///
	/// Bits without a name for that target are dropped.
	///
	/// ```
	/// use dukeasm::ast::modifier::{Modifier, Modifiers, ModifierTarget};
	/// let modifiers = Modifiers::from_flags(0x0029, ModifierTarget::Method);
	/// assert_eq!(modifiers.0, vec![Modifier::Public, Modifier::Static, Modifier::Synchronized]);
	/// assert_eq!(modifiers.value(), 0x0029);
	/// ```
	pub fn from_flags(flags: u16, target: ModifierTarget) -> Modifiers {
		Modifiers(TABLE.iter()
			.filter(|(_, _, value, targets)| flags & value != 0 && targets.contains(&target))
			.map(|(m, ..)| *m)
			.collect())
	}

	/// Parses whitespace separated modifier names for `target`.
	///
	/// Returns the first word that isn't a modifier of `target` as error, so `volatile` on a method doesn't turn
	/// into `bridge`, which shares its bit.
	pub fn parse(s: &str, target: ModifierTarget) -> Result<Modifiers, String> {
		s.split_whitespace()
			.map(|word| Modifier::from_name(word)
				.filter(|m| m.applies_to(target))
				.ok_or_else(|| word.to_owned()))
			.collect::<Result<_, _>>()
			.map(Modifiers)
	}
}

impl Print for Modifiers {
	fn print(&self, context: &dyn PrintContext) -> String {
		self.0.iter()
			.map(|m| context.keyword(m.name()))
			.collect::<Vec<_>>()
			.join(" ")
	}
}
