use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use duke::tree::class::ClassName;
use dukeasm::assembler::AssemblerOptions;

/// The assembler options as read from a JSON file. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct Config {
	pub(crate) verify: bool,
	pub(crate) generate_locals: bool,
	pub(crate) host_type: Option<String>,
	pub(crate) max_verifier_iterations: usize,
}

impl Default for Config {
	fn default() -> Self {
		let options = AssemblerOptions::default();
		Config {
			verify: options.verify,
			generate_locals: options.generate_locals,
			host_type: None,
			max_verifier_iterations: options.max_verifier_iterations,
		}
	}
}

impl Config {
	pub(crate) fn read(path: &Path) -> Result<Config> {
		let file = File::open(path)
			.with_context(|| format!("failed to open config file {path:?}"))?;
		serde_json::from_reader(BufReader::new(file))
			.with_context(|| format!("failed to read config file {path:?}"))
	}

	pub(crate) fn read_or_default(path: Option<&Path>) -> Result<Config> {
		path.map_or_else(|| Ok(Config::default()), Config::read)
	}

	pub(crate) fn into_options(self) -> Result<AssemblerOptions> {
		let host_type = self.host_type
			.map(|host_type| ClassName::try_from(host_type.as_str())
				.with_context(|| format!("invalid host type {host_type:?}")))
			.transpose()?;
		Ok(AssemblerOptions {
			verify: self.verify,
			generate_locals: self.generate_locals,
			host_type,
			max_verifier_iterations: self.max_verifier_iterations,
		})
	}
}

#[cfg(test)]
mod testing {
	use anyhow::Result;
	use pretty_assertions::assert_eq;
	use dukeasm::assembler::AssemblerOptions;
	use crate::config::Config;

	#[test]
	fn partial_config() -> Result<()> {
		let config: Config = serde_json::from_str(r#"{ "generate-locals": true, "host-type": "a/B" }"#)?;
		assert!(config.verify);
		let options = config.into_options()?;
		assert!(options.generate_locals);
		assert_eq!(options.host_type.as_ref().map(|x| x.as_inner()), Some("a/B"));
		assert_eq!(options.max_verifier_iterations, AssemblerOptions::default().max_verifier_iterations);

		let config: Config = serde_json::from_str(r#"{ "host-type": "a.B" }"#)?;
		assert!(config.into_options().is_err());
		Ok(())
	}
}
