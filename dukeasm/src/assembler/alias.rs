use indexmap::IndexMap;
use log::{trace, warn};
use crate::error::AliasError;
use crate::text::quoted;

/// Text macros, declared with `alias <name> "<value>"` and used as `${name}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
	aliases: IndexMap<String, String>,
}

/// A line after alias expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedLine {
	/// 1-based line number in the original text.
	pub line: u32,
	pub text: Result<String, AliasError>,
}

impl AliasTable {
	pub fn new() -> AliasTable {
		AliasTable::default()
	}

	/// Defines an alias, replacing any earlier definition.
	pub fn define(&mut self, name: &str, value: String) {
		if let Some(old) = self.aliases.insert(name.to_owned(), value) {
			warn!("alias {name:?} redefined, replacing {old:?}");
		}
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.aliases.get(name).map(String::as_str)
	}

	/// Replaces all `${name}` in a line with the value of the alias.
	pub fn expand(&self, line: &str) -> Result<String, AliasError> {
		let mut out = String::with_capacity(line.len());
		let mut rest = line;
		while let Some(start) = rest.find("${") {
			out.push_str(&rest[..start]);
			let after = &rest[start + 2..];
			let end = after.find('}').ok_or_else(|| AliasError::Unterminated(line.to_owned()))?;
			let name = &after[..end];
			let value = self.get(name).ok_or_else(|| AliasError::Unknown(name.to_owned()))?;
			out.push_str(value);
			rest = &after[end + 1..];
		}
		out.push_str(rest);
		Ok(out)
	}

	/// Handles a line if it's an alias declaration, returning `None` for any other line.
	///
	/// The value is expanded before it's defined, so aliases can build upon earlier ones.
	pub fn declaration(&mut self, line: &str) -> Option<Result<(), AliasError>> {
		let trimmed = line.trim_start();
		let (keyword, rest) = trimmed.split_once(char::is_whitespace)?;
		if !keyword.eq_ignore_ascii_case("alias") {
			return None;
		}
		Some(self.declare(rest.trim(), line))
	}

	fn declare(&mut self, declaration: &str, line: &str) -> Result<(), AliasError> {
		let malformed = || AliasError::Malformed(line.trim().to_owned());
		let (name, _) = declaration.split_once(char::is_whitespace).ok_or_else(malformed)?;
		if name.is_empty() || name.contains(['$', '{', '}', '"']) {
			return Err(malformed());
		}
		let value = quoted(declaration).ok_or_else(malformed)?;
		let value = self.expand(value)?;
		trace!("alias {name:?} = {value:?}");
		self.define(name, value);
		Ok(())
	}

	/// Runs over all lines: alias declarations are consumed, every other line is expanded.
	///
	/// This completes before any line is parsed, and a `${name}` only sees aliases declared above it.
	pub fn preprocess(&mut self, text: &str) -> Vec<ExpandedLine> {
		let mut lines = Vec::new();
		for (number, line) in (1..).zip(text.lines()) {
			match self.declaration(line) {
				Some(Ok(())) => {},
				Some(Err(e)) => lines.push(ExpandedLine { line: number, text: Err(e) }),
				None => lines.push(ExpandedLine { line: number, text: self.expand(line) }),
			}
		}
		lines
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use crate::assembler::alias::{AliasTable, ExpandedLine};
	use crate::error::AliasError;

	#[test]
	fn expansion() {
		let mut aliases = AliasTable::new();
		aliases.define("owner", "java/lang/System".to_owned());
		assert_eq!(aliases.expand("GETSTATIC ${owner}.out Ljava/io/PrintStream;").as_deref(),
			Ok("GETSTATIC java/lang/System.out Ljava/io/PrintStream;"));
		assert_eq!(aliases.expand("${owner}${owner}").as_deref(), Ok("java/lang/Systemjava/lang/System"));
		assert_eq!(aliases.expand("LDC ${nope}"), Err(AliasError::Unknown("nope".to_owned())));
		assert_eq!(aliases.expand("LDC ${owner"), Err(AliasError::Unterminated("LDC ${owner".to_owned())));
		assert_eq!(aliases.expand("no aliases").as_deref(), Ok("no aliases"));
	}

	#[test]
	fn preprocess_lines() {
		let mut aliases = AliasTable::new();
		let lines = aliases.preprocess("\
			alias greeting \"hello \"world\"\"\n\
			alias twice \"${greeting} ${greeting}\"\n\
			LDC \"${twice}\"\n\
			ALIAS broken\n\
			LDC ${later}\n\
			alias later \"1\"\n\
			RETURN");
		assert_eq!(lines, vec![
			ExpandedLine { line: 3, text: Ok("LDC \"hello \"world\" hello \"world\"\"".to_owned()) },
			ExpandedLine { line: 4, text: Err(AliasError::Malformed("ALIAS broken".to_owned())) },
			ExpandedLine { line: 5, text: Err(AliasError::Unknown("later".to_owned())) },
			ExpandedLine { line: 7, text: Ok("RETURN".to_owned()) },
		]);
	}

	#[test]
	fn redefinition_replaces() {
		let mut aliases = AliasTable::new();
		aliases.preprocess("alias x \"1\"\nalias x \"2\"");
		assert_eq!(aliases.get("x"), Some("2"));
	}
}
