use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, error, info, LevelFilter};
use serde::Serialize;
use walkdir::WalkDir;
use dukeasm::assembler::Assembler;
use dukeasm::ast::{Ansi, Plain, Print, PrintContext};
use dukeasm::disassembler::Disassembler;
use dukeasm::error::AssemblyError;
use crate::config::Config;

mod config;

#[derive(Debug, Parser)]
#[command(name = "duke-workbench", about = "Assembles and checks JVM method sources")]
struct Cli {
	/// Be verbose, give twice for even more output.
	#[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
	verbose: u8,

	/// Only print errors.
	#[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
	quiet: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Assembles a method source, printing it back in canonical form or listing the errors.
	Assemble {
		file: PathBuf,
		#[arg(long = "no-verify")]
		no_verify: bool,
		/// Emit a local variable table for all named variables.
		#[arg(long = "generate-locals")]
		generate_locals: bool,
		/// The class the method is in, for the type of `this`.
		#[arg(long = "host-type")]
		host_type: Option<String>,
		/// A JSON file with assembler options. Flags given on the command line take precedence.
		#[arg(long = "config")]
		config: Option<PathBuf>,
		/// Print errors as a JSON array.
		#[arg(long = "json")]
		json: bool,
		/// Colour the printed method.
		#[arg(long = "color")]
		color: bool,
	},
	/// Assembles all `.jasm` files in a directory, recursively.
	Check {
		dir: PathBuf,
		#[arg(long = "config")]
		config: Option<PathBuf>,
	},
}

#[derive(Debug, Serialize)]
struct JsonError {
	line: i64,
	message: String,
}

fn setup_logger(level: LevelFilter) -> Result<()> {
	fern::Dispatch::new()
		.format(|out, message, record| {
			out.finish(format_args!("[{} {}] {}", record.level(), record.target(), message))
		})
		.level(level)
		.chain(std::io::stderr())
		.apply()
		.context("failed to set up logging")
}

/// The `(line, message)` pairs of a failed assembly. An error without line errors becomes a single unattributed one.
fn error_pairs(error: &AssemblyError) -> Vec<(i64, String)> {
	match error.errors() {
		[] => vec![(-1, error.to_string())],
		errors => errors.iter().map(|error| error.to_pair()).collect(),
	}
}

fn read_source(path: &Path) -> Result<String> {
	fs::read_to_string(path)
		.with_context(|| anyhow!("failed to read method source {path:?}"))
}

fn assemble(file: &Path, config: Config, json: bool, color: bool) -> Result<ExitCode> {
	let text = read_source(file)?;
	let mut assembler = Assembler::new(config.into_options()?);

	match assembler.assemble_source(&text) {
		Ok((_, assembled)) => {
			let definition = Disassembler::method(&assembled.method)
				.with_context(|| anyhow!("failed to disassemble the method assembled from {file:?}"))?;
			let context: &dyn PrintContext = if color { &Ansi } else { &Plain };
			println!("{}", definition.print(context));
			Ok(ExitCode::SUCCESS)
		},
		Err(e) => {
			let pairs = error_pairs(&e);
			if json {
				let errors: Vec<_> = pairs.into_iter()
					.map(|(line, message)| JsonError { line, message })
					.collect();
				println!("{}", serde_json::to_string_pretty(&errors)?);
			} else {
				for (line, message) in pairs {
					println!("{line}: {message}");
				}
			}
			Ok(ExitCode::FAILURE)
		},
	}
}

fn check(dir: &Path, config: Config) -> Result<ExitCode> {
	let files: Vec<PathBuf> = WalkDir::new(dir)
		.sort_by_file_name()
		.into_iter()
		.filter(|res| res.as_ref().map_or(true, |entry| entry.file_type().is_file()))
		.map(|res| res.map(|entry| entry.into_path()))
		.collect::<Result<Vec<_>, walkdir::Error>>()
		.with_context(|| anyhow!("failed to walk directory {dir:?}"))?
		.into_iter()
		.filter(|path| path.extension().is_some_and(|extension| extension == "jasm"))
		.collect();
	debug!("checking {} files in {dir:?}", files.len());

	let options = config.into_options()?;
	let mut failed = 0;
	for file in &files {
		let text = read_source(file)?;
		let mut assembler = Assembler::new(options.clone());
		match assembler.assemble_source(&text) {
			Ok(_) => info!("{}: ok", file.display()),
			Err(e) => {
				failed += 1;
				let pairs = error_pairs(&e);
				println!("{}: {} errors", file.display(), pairs.len());
				for (line, message) in pairs {
					error!("{}:{line}: {message}", file.display());
				}
			},
		}
	}

	println!("checked {} files, {failed} failed", files.len());
	Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn main() -> Result<ExitCode> {
	let cli = Cli::parse();

	let level = match (cli.quiet, cli.verbose) {
		(true, _) => LevelFilter::Error,
		(false, 0) => LevelFilter::Warn,
		(false, 1) => LevelFilter::Debug,
		(false, _) => LevelFilter::Trace,
	};
	setup_logger(level)?;

	match cli.command {
		Command::Assemble { file, no_verify, generate_locals, host_type, config, json, color } => {
			let mut config = Config::read_or_default(config.as_deref())?;
			if no_verify {
				config.verify = false;
			}
			if generate_locals {
				config.generate_locals = true;
			}
			if host_type.is_some() {
				config.host_type = host_type;
			}
			assemble(&file, config, json, color)
		},
		Command::Check { dir, config } => {
			let config = Config::read_or_default(config.as_deref())?;
			check(&dir, config)
		},
	}
}

#[cfg(test)]
mod testing {
	use pretty_assertions::assert_eq;
	use clap::Parser;
	use dukeasm::error::AssemblyError;
	use crate::{error_pairs, Cli, Command};

	#[test]
	fn arguments() {
		let cli = Cli::parse_from(["duke-workbench", "-vv", "assemble", "a.jasm", "--no-verify", "--host-type", "a/B"]);
		assert_eq!(cli.verbose, 2);
		let Command::Assemble { no_verify, host_type, generate_locals, .. } = cli.command else {
			panic!("expected the assemble command, got {:?}", cli.command);
		};
		assert!(no_verify);
		assert!(!generate_locals);
		assert_eq!(host_type.as_deref(), Some("a/B"));

		assert!(Cli::try_parse_from(["duke-workbench", "-q", "-v", "check", "."]).is_err());
	}

	#[test]
	fn missing_declaration_is_unattributed() {
		let pairs = error_pairs(&AssemblyError::MissingDeclaration);
		assert_eq!(pairs.len(), 1);
		assert_eq!(pairs[0].0, -1);
	}
}
