//! Rendering a [`Config`] back to text.
//!
//! Output parses back to an equal store. Comments and layout of the source
//! are not kept, and sections come out in sorted order.

use crate::config::types::{Config, Section, ValueSet};
use std::fmt;

impl fmt::Display for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_values(f, &self.base_values)?;
		for section in self.sections.values() {
			write!(f, "{section}")?;
		}
		Ok(())
	}
}

impl fmt::Display for Section {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.values.is_empty() {
			writeln!(f, "[{}]", self.orig_case_name)?;
			write_values(f, &self.values)?;
		}
		for sub_section in self.sub_sections.values() {
			if sub_section.values.is_empty() {
				continue;
			}
			writeln!(
				f,
				"[{} \"{}\"]",
				self.orig_case_name,
				escape_value(&sub_section.name)
			)?;
			write_values(f, &sub_section.values)?;
		}
		Ok(())
	}
}

fn write_values(f: &mut fmt::Formatter<'_>, values: &ValueSet) -> fmt::Result {
	for entry in values.iter() {
		for value in &entry.values {
			match value {
				Some(value) => writeln!(f, "\t{} = {}", entry.orig_case_name, quote_value(value))?,
				None => writeln!(f, "\t{}", entry.orig_case_name)?,
			}
		}
	}
	Ok(())
}

/// Escape backslashes, quotes, tabs and newlines so the parser reads the
/// same characters back.
pub fn escape_value(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => escaped.push_str("\\\\"),
			'"' => escaped.push_str("\\\""),
			'\t' => escaped.push_str("\\t"),
			'\n' => escaped.push_str("\\n"),
			c => escaped.push(c),
		}
	}
	escaped
}

/// Escape a value and wrap it in quotes if the parser would otherwise trim
/// it or read part of it as a comment.
fn quote_value(value: &str) -> String {
	let escaped = escape_value(value);
	let needs_quotes = escaped.starts_with(char::is_whitespace)
		|| escaped.ends_with(char::is_whitespace)
		|| escaped.contains(['#', ';', '!', '$', '`']);
	if needs_quotes {
		format!("\"{escaped}\"")
	} else {
		escaped
	}
}
