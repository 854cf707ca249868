//! Typed lookups by dotted key.
//!
//! Missing keys come back as `None`; only values that exist but can't be
//! coerced produce a [`ValueError`].

use crate::config::key::parse_section_key;
use crate::config::types::{Config, ConfigValue};
use crate::error::ValueError;
use std::num::ParseIntError;
use std::str::FromStr;

impl Config {
	/// All values stored for `key` (`section.subsection.key`).
	pub fn get_raw(&self, key: &str) -> Option<&ConfigValue> {
		let parsed = parse_section_key(key);
		if parsed.key.is_empty() {
			return None;
		}
		self.value_set(&parsed.section, &parsed.sub_section)?
			.get(&parsed.key)
	}

	/// Every value of `key` in file order; bare keys read as `""`.
	pub fn get_strings(&self, key: &str) -> Option<Vec<&str>> {
		self.get_raw(key).map(ConfigValue::strings)
	}

	pub fn get_ints(&self, key: &str) -> Result<Option<Vec<i64>>, ValueError> {
		self.get_raw(key).map(ConfigValue::ints).transpose()
	}

	pub fn get_uints(&self, key: &str) -> Result<Option<Vec<u64>>, ValueError> {
		self.get_raw(key).map(ConfigValue::uints).transpose()
	}

	pub fn get_bools(&self, key: &str) -> Result<Option<Vec<bool>>, ValueError> {
		self.get_raw(key).map(ConfigValue::bools).transpose()
	}

	/// The last value of `key`. A bare key reads as `""`.
	pub fn get_string(&self, key: &str) -> Option<&str> {
		self.get_raw(key).map(ConfigValue::string)
	}

	pub fn get_int(&self, key: &str) -> Result<Option<i64>, ValueError> {
		self.get_raw(key).map(ConfigValue::int).transpose()
	}

	pub fn get_uint(&self, key: &str) -> Result<Option<u64>, ValueError> {
		self.get_raw(key).map(ConfigValue::uint).transpose()
	}

	/// The last value of `key` as a boolean. A bare key reads as `false`.
	pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ValueError> {
		self.get_raw(key).map(ConfigValue::bool).transpose()
	}
}

impl ConfigValue {
	pub fn strings(&self) -> Vec<&str> {
		self.values
			.iter()
			.map(|value| value.as_deref().unwrap_or_default())
			.collect()
	}

	pub fn ints(&self) -> Result<Vec<i64>, ValueError> {
		self.values.iter().map(|v| parse_int(v.as_deref())).collect()
	}

	pub fn uints(&self) -> Result<Vec<u64>, ValueError> {
		self.values.iter().map(|v| parse_uint(v.as_deref())).collect()
	}

	pub fn bools(&self) -> Result<Vec<bool>, ValueError> {
		self.values.iter().map(|v| parse_bool(v.as_deref())).collect()
	}

	pub fn string(&self) -> &str {
		self.last().unwrap_or_default()
	}

	pub fn int(&self) -> Result<i64, ValueError> {
		parse_int(self.values.last().and_then(Option::as_deref))
	}

	pub fn uint(&self) -> Result<u64, ValueError> {
		parse_uint(self.values.last().and_then(Option::as_deref))
	}

	pub fn bool(&self) -> Result<bool, ValueError> {
		parse_bool(self.values.last().and_then(Option::as_deref))
	}
}

pub(crate) fn parse_int(value: Option<&str>) -> Result<i64, ValueError> {
	parse_integer(value, "i64")
}

pub(crate) fn parse_uint(value: Option<&str>) -> Result<u64, ValueError> {
	parse_integer(value, "u64")
}

/// Parse a decimal integer of any width, naming `ty` in errors.
pub(crate) fn parse_integer<T>(value: Option<&str>, ty: &'static str) -> Result<T, ValueError>
where
	T: FromStr<Err = ParseIntError>,
{
	let value = value.ok_or(ValueError::Empty { ty })?;
	value
		.parse::<T>()
		.map_err(|source| ValueError::InvalidInteger {
			value: value.to_string(),
			ty,
			source,
		})
}

/// Git's notion of truth: empty or bare is false, integers are true unless
/// zero, and `true`/`yes`/`false`/`no` in any case.
pub(crate) fn parse_bool(value: Option<&str>) -> Result<bool, ValueError> {
	let Some(value) = value.filter(|v| !v.is_empty()) else {
		return Ok(false);
	};
	if let Ok(number) = value.parse::<i64>() {
		return Ok(number != 0);
	}
	match value.to_lowercase().as_str() {
		"true" | "yes" => Ok(true),
		"false" | "no" => Ok(false),
		_ => Err(ValueError::InvalidBool {
			value: value.to_string(),
		}),
	}
}
