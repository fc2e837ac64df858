pub mod class;
pub mod field;
pub mod method;
pub mod version;
pub mod module;
pub mod annotation;
pub mod descriptor;
pub mod record;

mod names {
	/// Checks if a class name is valid according to JVMS 4.2.1 (also accepting array class names).
	pub(super) fn is_valid_class_name(x: &str) -> bool {
		if x.starts_with('[') {
			// an array class name is a field descriptor
			crate::tree::descriptor::is_valid_field_descriptor(x)
		} else {
			// a list of identifiers split by /
			// each identifier must be an unqualified name
			x.split('/').all(is_valid_unqualified_name)
		}
	}

	/// Checks if a name is an unqualified name according to JVMS 4.2.2
	///
	/// This is used for field names, formal parameter names, local variable names.
	pub(super) fn is_valid_unqualified_name(x: &str) -> bool {
		// must contain at least one unicode codepoint
		!x.is_empty() &&
			// must not contain any of . ; [
			// /
			x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/'))

	}

	/// Checks if a method name is valid according to JVMS 4.2.2
	pub(super) fn is_valid_method_name(x: &str) -> bool {
		// either one of the special names or an unqualified name with special < > restriction
		x == "<init>" || x == "<clinit>" || (
			// must contain at least one unicode codepoint
			!x.is_empty() &&
				x.chars().all(|c| !matches!(c, '.' | ';' | '[' | '/' | '<' | '>'))
		)
	}

	/// Checks if a module name is valid according to JVMS 4.2.3
	pub(super) fn is_valid_module_name(x: &str) -> bool {
		!x.is_empty() && !x.ends_with('\\') &&
			x.chars().all(|c| !matches!(c, '\0'..='\x1f' | ':' | '@'))
	}

}