use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, debug};

use gitcfg::GitcfgError;
use gitcfg::config::{Config, ValueSet, parse_config_file_with, user_config_path};

#[derive(Parser)]
#[command(name = "gitcfg")]
#[command(author, version, about = "Read, query and reformat git-config style files")]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Config file to read (defaults to ~/.gitconfig)
	#[arg(short, long, global = true, value_name = "PATH")]
	file: Option<PathBuf>,

	/// Reject unknown escapes in subsection names instead of dropping them
	#[arg(long, global = true)]
	strict: bool,

	/// Log parse and bind details to stderr
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the value of a key such as `section.sub.key`
	Get {
		key: String,

		/// Print every value in file order instead of only the last
		#[arg(long)]
		all: bool,

		/// Coerce values before printing
		#[arg(long = "type", value_enum, default_value_t = ValueType::String)]
		value_type: ValueType,
	},
	/// Print every entry as `name=value`
	List,
	/// Print the file in normalized form
	Fmt,
	/// Check the file for errors
	Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueType {
	String,
	Int,
	Uint,
	Bool,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool) {
	let level = if verbose { Level::DEBUG } else { Level::WARN };
	tracing_subscriber::fmt()
		.with_max_level(level)
		.with_writer(std::io::stderr)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	let path = match cli.file {
		Some(path) => path,
		None => user_config_path().context("Failed to locate user config")?,
	};
	debug!(path = %path.display(), "Using config file");

	let parsed = parse_config_file_with(&path, cli.strict);

	if matches!(cli.command, Commands::Check) {
		return handle_check(&path, parsed);
	}
	let config = parsed.with_context(|| format!("Failed to load {}", path.display()))?;

	match cli.command {
		Commands::Get {
			key,
			all,
			value_type,
		} => handle_get(&config, &key, all, value_type),
		Commands::List => handle_list(&config),
		Commands::Fmt => {
			print!("{config}");
			Ok(ExitCode::SUCCESS)
		}
		Commands::Check => handle_check(&path, Ok(config)),
	}
}

fn handle_check(path: &Path, parsed: gitcfg::Result<Config>) -> Result<ExitCode> {
	match parsed {
		Ok(config) => {
			println!(
				"{} is valid ({} sections)",
				path.display(),
				config.sections.len()
			);
			Ok(ExitCode::SUCCESS)
		}
		Err(GitcfgError::ConfigParseError { source, .. }) => {
			eprintln!("{}: {}", path.display(), source);
			Ok(ExitCode::FAILURE)
		}
		Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to load {}", path.display()))),
	}
}

fn handle_get(config: &Config, key: &str, all: bool, value_type: ValueType) -> Result<ExitCode> {
	let Some(entry) = config.get_raw(key) else {
		debug!(key, "Key not found");
		return Ok(ExitCode::FAILURE);
	};

	let invalid = || format!("Invalid value for {key}");
	let values: Vec<String> = match value_type {
		ValueType::String => entry.strings().into_iter().map(str::to_string).collect(),
		ValueType::Int => to_strings(entry.ints().with_context(invalid)?),
		ValueType::Uint => to_strings(entry.uints().with_context(invalid)?),
		ValueType::Bool => to_strings(entry.bools().with_context(invalid)?),
	};

	if all {
		for value in &values {
			println!("{value}");
		}
	} else if let Some(value) = values.last() {
		println!("{value}");
	}
	Ok(ExitCode::SUCCESS)
}

fn to_strings<T: ToString>(values: Vec<T>) -> Vec<String> {
	values.iter().map(ToString::to_string).collect()
}

fn handle_list(config: &Config) -> Result<ExitCode> {
	print_values("", &config.base_values);
	for section in config.sections.values() {
		print_values(&format!("{}.", section.name), &section.values);
		for sub_section in section.sub_sections.values() {
			print_values(
				&format!("{}.{}.", section.name, sub_section.name),
				&sub_section.values,
			);
		}
	}
	Ok(ExitCode::SUCCESS)
}

fn print_values(prefix: &str, values: &ValueSet) {
	for entry in values.iter() {
		for value in &entry.values {
			match value {
				Some(value) => println!("{prefix}{}={value}", entry.name),
				None => println!("{prefix}{}", entry.name),
			}
		}
	}
}
