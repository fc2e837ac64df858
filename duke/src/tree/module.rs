use std::fmt::{Debug, Formatter};
use anyhow::bail;
use crate::macros::{make_display, make_string_str_like};
use crate::tree::class::ClassName;

/// The contents of the `Module` attribute of a `module-info` class.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
	pub name: ModuleName,
	pub flags: ModuleFlags,
	pub version: Option<String>,
	pub requires: Vec<ModuleRequires>,
	pub exports: Vec<ModuleExports>,
	pub opens: Vec<ModuleOpens>,
	pub uses: Vec<ClassName>,
	pub provides: Vec<ModuleProvides>,
}

make_string_str_like!(
	/// A module name, like `java.base`. Note that module names use dots, not slashes.
	pub ModuleName(String);
	pub ModuleNameSlice(str);
	is_valid(s) = if crate::tree::names::is_valid_module_name(s) {
		Ok(())
	} else {
		bail!("invalid module name: must be non-empty and not contain any of `:`, `@` or control characters")
	};
);
make_display!(ModuleName, ModuleNameSlice);

make_string_str_like!(
	/// A package name in internal form, like `java/lang`.
	pub PackageName(String);
	pub PackageNameSlice(str);
	is_valid(s) = if crate::tree::names::is_valid_class_name(s) && !s.starts_with('[') {
		Ok(())
	} else {
		bail!("invalid package name: must consist out of `/` separated non-empty parts")
	};
);
make_display!(PackageName, PackageNameSlice);

#[derive(Copy, Clone, Default, PartialEq)]
pub struct ModuleFlags {
	pub is_open: bool,
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleFlags { ")?;
		if self.is_open      { f.write_str("open ")?; }
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated  { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleFlags {
	fn from(value: u16) -> Self {
		ModuleFlags {
			is_open:      value & 0x0020 != 0,
			is_synthetic: value & 0x1000 != 0,
			is_mandated:  value & 0x8000 != 0,
		}
	}
}

impl From<ModuleFlags> for u16 {
	fn from(value: ModuleFlags) -> Self {
		(if value.is_open      { 0x0020 } else { 0 }) |
		(if value.is_synthetic { 0x1000 } else { 0 }) |
		(if value.is_mandated  { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRequires {
	pub name: ModuleName,
	pub flags: ModuleRequiresFlags,
	pub version: Option<String>,
}

#[derive(Copy, Clone, Default, PartialEq)]
pub struct ModuleRequiresFlags {
	pub is_transitive: bool,
	pub is_static_phase: bool,
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModuleRequiresFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModuleRequiresFlags { ")?;
		if self.is_transitive   { f.write_str("transitive ")?; }
		if self.is_static_phase { f.write_str("static-phase ")?; }
		if self.is_synthetic    { f.write_str("synthetic ")?; }
		if self.is_mandated     { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModuleRequiresFlags {
	fn from(value: u16) -> Self {
		ModuleRequiresFlags {
			is_transitive:   value & 0x0020 != 0,
			is_static_phase: value & 0x0040 != 0,
			is_synthetic:    value & 0x1000 != 0,
			is_mandated:     value & 0x8000 != 0,
		}
	}
}

impl From<ModuleRequiresFlags> for u16 {
	fn from(value: ModuleRequiresFlags) -> Self {
		(if value.is_transitive   { 0x0020 } else { 0 }) |
		(if value.is_static_phase { 0x0040 } else { 0 }) |
		(if value.is_synthetic    { 0x1000 } else { 0 }) |
		(if value.is_mandated     { 0x8000 } else { 0 })
	}
}

/// The flags of both `exports` and `opens` entries.
#[derive(Copy, Clone, Default, PartialEq)]
pub struct ModulePackageFlags {
	pub is_synthetic: bool,
	pub is_mandated: bool,
}

impl Debug for ModulePackageFlags {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("ModulePackageFlags { ")?;
		if self.is_synthetic { f.write_str("synthetic ")?; }
		if self.is_mandated  { f.write_str("mandated ")?; }
		f.write_str("}")
	}
}

impl From<u16> for ModulePackageFlags {
	fn from(value: u16) -> Self {
		ModulePackageFlags {
			is_synthetic: value & 0x1000 != 0,
			is_mandated:  value & 0x8000 != 0,
		}
	}
}

impl From<ModulePackageFlags> for u16 {
	fn from(value: ModulePackageFlags) -> Self {
		(if value.is_synthetic { 0x1000 } else { 0 }) |
		(if value.is_mandated  { 0x8000 } else { 0 })
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExports {
	pub name: PackageName,
	pub flags: ModulePackageFlags,
	pub exports_to: Vec<ModuleName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOpens {
	pub name: PackageName,
	pub flags: ModulePackageFlags,
	pub opens_to: Vec<ModuleName>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProvides {
	pub name: ClassName,
	pub provides_with: Vec<ClassName>,
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::tree::module::{ModuleFlags, ModuleName, ModuleRequiresFlags, PackageName};

	#[test]
	fn flags_round_trip() {
		for value in [0x0020, 0x1000, 0x8020] {
			assert_eq!(u16::from(ModuleFlags::from(value)), value);
		}
		for value in [0x0020, 0x0040, 0x9060] {
			assert_eq!(u16::from(ModuleRequiresFlags::from(value)), value);
		}
	}

	#[test]
	fn names() {
		assert!(ModuleName::is_valid("java.base"));
		assert!(PackageName::is_valid("java/lang"));
		assert!(!PackageName::is_valid("[I"));
	}
}
