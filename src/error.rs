use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::num::ParseIntError;
use std::path::PathBuf;

/// Library-level structured errors for gitcfg.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum GitcfgError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: ParseError,
	},

	#[error("Failed to read config data")]
	ReadError {
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Parse(#[from] ParseError),

	#[error(transparent)]
	Value(#[from] ValueError),

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using GitcfgError.
pub type Result<T> = std::result::Result<T, GitcfgError>;

/// A grammar violation, positioned on the line where it was found.
///
/// Parsing stops at the first one of these; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Line: {line_no} Char: {char_pos}\n{line}\n{indent}^\n{kind}", indent = caret_indent(.char_pos))]
pub struct ParseError {
	/// What went wrong.
	pub kind: ParseErrorKind,

	/// Full text of the offending line.
	pub line: String,

	/// 1-based line number.
	pub line_no: usize,

	/// 1-based character offset of the last character read, 0 if none was.
	pub char_pos: usize,
}

fn caret_indent(char_pos: &usize) -> String {
	" ".repeat(char_pos.saturating_sub(1))
}

/// The reason a line failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
	#[error("Unexpected '{c}' in section name '{section}'")]
	UnexpectedInSectionName { c: char, section: String },

	#[error("Unexpected [ in section name '{section}'")]
	NestedBracket { section: String },

	#[error("Unexpected \" before section name")]
	QuoteBeforeSectionName,

	#[error("Unexpected \" in section name '{section}', only one sub-section is allowed")]
	DuplicateSubSection { section: String },

	#[error("Unexpected '{c}' after sub-section name in section '{section}'")]
	NameAfterSubSection { c: char, section: String },

	#[error("Empty section name")]
	EmptySectionName,

	#[error("Unexpected end of line when reading section")]
	UnterminatedSection,

	#[error("Unexpected end of line when reading sub-section")]
	UnterminatedSubSection,

	#[error("Unexpected '{c}' in sub-section escape, only double-quote, n, t and \\ are allowed to be escaped")]
	InvalidSubSectionEscape { c: char },

	#[error("Unexpected '{c}' starting key, expected a letter")]
	InvalidKeyStart { c: char },

	#[error("Unexpected '{c}' in key '{key}', expected an ascii letter, hyphen or digit")]
	InvalidKeyChar { c: char, key: String },

	#[error("Unexpected '{c}' after key '{key}', expected =, whitespace or newline")]
	UnexpectedAfterKey { c: char, key: String },

	#[error("Missing key before '='")]
	MissingKey,

	#[error("Unexpected '{c}' in escape, only double-quote, n, t and \\ are allowed to be escaped")]
	InvalidEscape { c: char },

	#[error("Unexpected newline in quoted value string: '{value}'")]
	UnterminatedQuote { value: String },
}

/// A stored value could not be coerced to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
	#[error("Cannot convert empty value to {ty}")]
	Empty { ty: &'static str },

	#[error("Cannot convert '{value}' to {ty}")]
	InvalidInteger {
		value: String,
		ty: &'static str,
		#[source]
		source: ParseIntError,
	},

	#[error("Cannot convert '{value}' to bool. Can deal with <empty>/<numeric>/true/yes/false/no")]
	InvalidBool { value: String },

	#[error("Cannot convert '{value}' to duration: {reason}")]
	InvalidDuration { value: String, reason: &'static str },
}

/// Why a single field could not be populated.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
	#[error("Could not populate required {ty}, no value for {path}")]
	Required { ty: String, path: String },

	#[error("Could not parse value for {path} as {ty}: {source}")]
	InvalidValue {
		ty: String,
		path: String,
		#[source]
		source: ValueError,
	},

	#[error("Could not populate default {ty} field, default value {default:?} did not parse: {source}")]
	InvalidDefault {
		ty: String,
		default: String,
		#[source]
		source: ValueError,
	},

	#[error("cannot populate field {path} of type {ty}. {reason}")]
	InvalidShape {
		ty: String,
		path: String,
		reason: String,
	},

	#[error("cannot populate field {path} of type {ty}. Required section '{section}' was not present")]
	MissingSection {
		ty: String,
		path: String,
		section: String,
	},

	#[error(
		"cannot populate field {path} of type {ty}. Sub-section name '{name}' could not be parsed as required key-type: {source}"
	)]
	SubSectionName {
		ty: String,
		path: String,
		name: String,
		#[source]
		source: ValueError,
	},

	#[error(
		"cannot populate field {path} of type {ty}. Contents of sub-section '{name}' could not be parsed as required value-type: {source}"
	)]
	SubSection {
		ty: String,
		path: String,
		name: String,
		#[source]
		source: Box<BindError>,
	},

	#[error("cannot populate field {path} of type {ty}: {source}")]
	Record {
		ty: String,
		path: String,
		#[source]
		source: LoadError,
	},
}

/// A [`BindError`] tagged with the field it happened on.
#[derive(Debug, thiserror::Error)]
#[error("Could not populate {ty} field {field:?}: {source}")]
pub struct FieldError {
	/// Field name as registered in the record description.
	pub field: &'static str,

	/// Human readable label of the field's type.
	pub ty: String,

	#[source]
	pub source: BindError,
}

impl FieldError {
	/// True if the field failed only because a required value was missing.
	pub fn is_required(&self) -> bool {
		matches!(self.source, BindError::Required { .. })
	}
}

/// Every field failure of one bind call, keyed by the field's full path.
#[derive(Debug, Default, thiserror::Error)]
#[error("{}", describe_errors(.errors))]
pub struct LoadError {
	errors: BTreeMap<String, FieldError>,
}

impl LoadError {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	pub fn get(&self, path: &str) -> Option<&FieldError> {
		self.errors.get(path)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
		self.errors.iter().map(|(path, error)| (path.as_str(), error))
	}

	pub fn into_inner(self) -> BTreeMap<String, FieldError> {
		self.errors
	}

	pub(crate) fn insert(&mut self, path: String, error: FieldError) {
		self.errors.insert(path, error);
	}
}

fn describe_errors(errors: &BTreeMap<String, FieldError>) -> String {
	let mut out = String::new();
	match errors.len() {
		0 => out.push_str("No errors occurred"),
		1 => {}
		_ => out.push_str("The following errors occurred:\n"),
	}
	for (path, error) in errors {
		let _ = writeln!(out, "When attempting to assign '{path}':\n - {error}");
	}
	out.trim_end().to_string()
}
