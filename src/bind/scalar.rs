use crate::bind::duration::{SignedDuration, parse_duration};
use crate::config::lookup::{parse_bool, parse_integer};
use crate::error::ValueError;
use std::fmt;
use std::time::Duration;

/// The kinds of single value a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
	String,
	Bool,
	Int(&'static str),
	Uint(&'static str),
	Duration(&'static str),
}

impl fmt::Display for ScalarKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ScalarKind::String => f.write_str("string"),
			ScalarKind::Bool => f.write_str("bool"),
			ScalarKind::Int(name) | ScalarKind::Uint(name) | ScalarKind::Duration(name) => {
				f.write_str(name)
			}
		}
	}
}

/// A type that can be read from one stored value.
///
/// `None` is a bare key written without `=`. Defaults are passed through
/// the same conversion as values found in the config.
pub trait Scalar: Sized {
	const KIND: ScalarKind;

	fn from_value(value: Option<&str>) -> Result<Self, ValueError>;
}

impl Scalar for String {
	const KIND: ScalarKind = ScalarKind::String;

	fn from_value(value: Option<&str>) -> Result<Self, ValueError> {
		Ok(value.unwrap_or_default().to_string())
	}
}

impl Scalar for bool {
	const KIND: ScalarKind = ScalarKind::Bool;

	fn from_value(value: Option<&str>) -> Result<Self, ValueError> {
		parse_bool(value)
	}
}

macro_rules! integer_scalar {
	($($kind:ident => $($ty:ty),+;)+) => {
		$($(
			impl Scalar for $ty {
				const KIND: ScalarKind = ScalarKind::$kind(stringify!($ty));

				fn from_value(value: Option<&str>) -> Result<Self, ValueError> {
					parse_integer(value, stringify!($ty))
				}
			}
		)+)+
	};
}

integer_scalar! {
	Int => i8, i16, i32, i64, isize;
	Uint => u8, u16, u32, u64, usize;
}

impl Scalar for SignedDuration {
	const KIND: ScalarKind = ScalarKind::Duration("SignedDuration");

	fn from_value(value: Option<&str>) -> Result<Self, ValueError> {
		parse_duration(value.unwrap_or_default())
	}
}

impl Scalar for Duration {
	const KIND: ScalarKind = ScalarKind::Duration("Duration");

	fn from_value(value: Option<&str>) -> Result<Self, ValueError> {
		let raw = value.unwrap_or_default();
		parse_duration(raw)?
			.to_std()
			.ok_or_else(|| ValueError::InvalidDuration {
				value: raw.to_string(),
				reason: "negative duration",
			})
	}
}
