use crate::error::ValueError;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A length of time that can be negative, with nanosecond precision.
///
/// Parsed from literals such as `300ms`, `1h30m` or `-1.5s`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignedDuration {
	nanos: i64,
}

impl SignedDuration {
	pub const ZERO: Self = Self { nanos: 0 };

	pub const fn from_nanos(nanos: i64) -> Self {
		Self { nanos }
	}

	pub const fn from_secs(secs: i64) -> Self {
		Self {
			nanos: secs.saturating_mul(NANOS_PER_SEC as i64),
		}
	}

	pub const fn as_nanos(self) -> i64 {
		self.nanos
	}

	pub const fn is_negative(self) -> bool {
		self.nanos < 0
	}

	/// The magnitude, dropping the sign.
	pub const fn unsigned_abs(self) -> Duration {
		Duration::from_nanos(self.nanos.unsigned_abs())
	}

	/// The equivalent [`Duration`], or `None` if negative.
	pub const fn to_std(self) -> Option<Duration> {
		if self.is_negative() {
			None
		} else {
			Some(self.unsigned_abs())
		}
	}
}

impl From<SignedDuration> for i64 {
	fn from(duration: SignedDuration) -> Self {
		duration.nanos
	}
}

impl FromStr for SignedDuration {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_duration(s)
	}
}

impl fmt::Display for SignedDuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.nanos == 0 {
			return f.write_str("0s");
		}
		if self.is_negative() {
			f.write_str("-")?;
		}
		let total = self.nanos.unsigned_abs();
		let secs = total / NANOS_PER_SEC;
		let frac = total % NANOS_PER_SEC;
		let (hours, minutes, secs) = (secs / 3600, secs / 60 % 60, secs % 60);

		if hours > 0 {
			write!(f, "{hours}h{minutes}m")?;
		} else if minutes > 0 {
			write!(f, "{minutes}m")?;
		}
		write!(f, "{secs}")?;
		if frac > 0 {
			let digits = format!("{frac:09}");
			write!(f, ".{}", digits.trim_end_matches('0'))?;
		}
		f.write_str("s")
	}
}

fn component_regex() -> &'static Regex {
	static REGEX: OnceLock<Regex> = OnceLock::new();
	REGEX.get_or_init(|| {
		Regex::new(r"^([0-9]*)(?:\.([0-9]*))?([^0-9.]*)").unwrap_or_else(|e| panic!("{}", e))
	})
}

fn unit_nanos(unit: &str) -> Option<u128> {
	let nanos = match unit {
		"ns" => 1,
		"us" | "µs" | "μs" => 1_000,
		"ms" => 1_000_000,
		"s" => 1_000_000_000,
		"m" => 60 * 1_000_000_000,
		"h" => 3600 * 1_000_000_000,
		_ => return None,
	};
	Some(nanos)
}

/// Parse a duration made of signed decimal numbers each followed by a unit
/// (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`), e.g. `2h45m` or `-0.5s`.
/// A bare `0` needs no unit.
pub fn parse_duration(value: &str) -> Result<SignedDuration, ValueError> {
	let invalid = |reason| ValueError::InvalidDuration {
		value: value.to_string(),
		reason,
	};

	let (negative, mut rest) = match value.as_bytes().first() {
		Some(b'-') => (true, &value[1..]),
		Some(b'+') => (false, &value[1..]),
		_ => (false, value),
	};
	if rest == "0" {
		return Ok(SignedDuration::ZERO);
	}
	if rest.is_empty() {
		return Err(invalid("invalid duration"));
	}

	let mut total: u128 = 0;
	while !rest.is_empty() {
		let captures = component_regex()
			.captures(rest)
			.ok_or_else(|| invalid("invalid duration"))?;
		let whole = captures.get(1).map_or("", |m| m.as_str());
		let frac = captures.get(2).map_or("", |m| m.as_str());
		let unit = captures.get(3).map_or("", |m| m.as_str());

		if whole.is_empty() && frac.is_empty() {
			return Err(invalid("invalid duration"));
		}
		if unit.is_empty() {
			return Err(invalid("missing unit in duration"));
		}
		let scale = unit_nanos(unit).ok_or_else(|| invalid("unknown unit in duration"))?;

		let whole: u128 = if whole.is_empty() {
			0
		} else {
			whole
				.parse::<u64>()
				.map_err(|_| invalid("duration out of range"))?
				.into()
		};
		// digits past the 18th can't change a nanosecond count
		let frac = &frac[..frac.len().min(18)];
		let frac_nanos = if frac.is_empty() {
			0
		} else {
			let digits: u128 = frac.parse().map_err(|_| invalid("invalid duration"))?;
			digits * scale / 10u128.pow(frac.len() as u32)
		};

		total += whole * scale + frac_nanos;
		if total > i64::MAX as u128 + u128::from(negative) {
			return Err(invalid("duration out of range"));
		}
		rest = &rest[captures.get(0).map_or(rest.len(), |m| m.end())..];
	}

	let nanos = if negative {
		(total as i128).wrapping_neg() as i64
	} else {
		total as i64
	};
	Ok(SignedDuration::from_nanos(nanos))
}
