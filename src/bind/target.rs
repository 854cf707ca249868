use crate::bind::duration::SignedDuration;
use crate::bind::scalar::{Scalar, ScalarKind};
use crate::bind::{Record, load_record};
use crate::config::types::{Config, ConfigValue};
use crate::error::BindError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

/// The closed set of shapes a bound field can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
	/// One value: the last one assigned.
	Scalar(ScalarKind),
	/// One value, left as `None` when absent.
	Optional(ScalarKind),
	/// The last `len` values.
	Array { len: usize, elem: ScalarKind },
	/// Every value, in file order.
	List(ScalarKind),
	/// One entry per sub-section, keyed by the sub-section name.
	Map { key: ScalarKind, value: Box<Shape> },
	/// Fields bound under the field's path.
	Record(&'static str),
}

impl fmt::Display for Shape {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Shape::Scalar(kind) => write!(f, "{kind}"),
			Shape::Optional(kind) => write!(f, "Option<{kind}>"),
			Shape::Array { len, elem } => write!(f, "[{elem}; {len}]"),
			Shape::List(kind) => write!(f, "Vec<{kind}>"),
			Shape::Map { key, value } => write!(f, "map<{key}, {value}>"),
			Shape::Record(name) => f.write_str(name),
		}
	}
}

/// Where a field's data comes from and what to do when there is none.
#[derive(Debug)]
pub struct Slot<'a> {
	config: &'a Config,
	path: String,
	values: Option<&'a ConfigValue>,
	required: bool,
	default: Option<&'a str>,
}

impl<'a> Slot<'a> {
	/// Resolve `path` against `config`. A default is ignored when `required`.
	pub(crate) fn new(
		config: &'a Config,
		path: String,
		required: bool,
		default: Option<&'a str>,
	) -> Self {
		let values = config.get_raw(&path);
		Self {
			config,
			path,
			values,
			required,
			default: if required { None } else { default },
		}
	}

	/// A slot naming a record's namespace, with no policy of its own.
	fn namespace(config: &'a Config, path: String) -> Self {
		Self {
			config,
			path,
			values: None,
			required: false,
			default: None,
		}
	}

	pub fn config(&self) -> &'a Config {
		self.config
	}

	/// Full dotted path of the field.
	pub fn path(&self) -> &str {
		&self.path
	}

	pub(crate) fn into_path(self) -> String {
		self.path
	}

	/// Values found at the path, if any.
	pub fn values(&self) -> Option<&'a ConfigValue> {
		self.values
	}

	pub fn required(&self) -> bool {
		self.required
	}

	pub fn default(&self) -> Option<&'a str> {
		self.default
	}

	/// Apply the missing-value policy to one scalar.
	///
	/// `found` is the raw value if one exists. Returns `None` when the
	/// field should be left as it is.
	pub fn resolve<T: Scalar>(
		&self,
		found: Option<Option<&str>>,
		shape: &Shape,
	) -> Result<Option<T>, BindError> {
		if let Some(raw) = found {
			return T::from_value(raw)
				.map(Some)
				.map_err(|source| BindError::InvalidValue {
					ty: shape.to_string(),
					path: self.path.clone(),
					source,
				});
		}
		if self.required {
			return Err(BindError::Required {
				ty: shape.to_string(),
				path: self.path.clone(),
			});
		}
		match self.default {
			Some(default) => T::from_value(Some(default))
				.map(Some)
				.map_err(|source| BindError::InvalidDefault {
					ty: shape.to_string(),
					default: default.to_string(),
					source,
				}),
			None => Ok(None),
		}
	}

	fn last_value(&self) -> Option<Option<&'a str>> {
		self.values
			.and_then(|entry| entry.values.last())
			.map(Option::as_deref)
	}
}

/// Something a field can be bound into.
///
/// Implemented for every [`Scalar`], for `Option`, arrays and `Vec`s of
/// scalars, for maps keyed by sub-section name, and for every [`Record`].
pub trait Target {
	fn shape() -> Shape;

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError>;
}

macro_rules! scalar_target {
	($($ty:ty),+ $(,)?) => {
		$(
			impl Target for $ty {
				fn shape() -> Shape {
					Shape::Scalar(<$ty as Scalar>::KIND)
				}

				fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
					if let Some(value) = slot.resolve(slot.last_value(), &Self::shape())? {
						*self = value;
					}
					Ok(())
				}
			}
		)+
	};
}

scalar_target!(
	String,
	bool,
	i8,
	i16,
	i32,
	i64,
	isize,
	u8,
	u16,
	u32,
	u64,
	usize,
	Duration,
	SignedDuration,
);

impl<T: Scalar> Target for Option<T> {
	fn shape() -> Shape {
		Shape::Optional(T::KIND)
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		if let Some(value) = slot.resolve(slot.last_value(), &Self::shape())? {
			*self = Some(value);
		}
		Ok(())
	}
}

impl<T: Scalar> Target for Vec<T> {
	fn shape() -> Shape {
		Shape::List(T::KIND)
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		let shape = Self::shape();
		*self = match slot.values() {
			Some(entry) => entry
				.values
				.iter()
				.map(|value| T::from_value(value.as_deref()))
				.collect::<Result<_, _>>()
				.map_err(|source| BindError::InvalidValue {
					ty: shape.to_string(),
					path: slot.path().to_string(),
					source,
				})?,
			None => slot.resolve(None, &shape)?.into_iter().collect(),
		};
		Ok(())
	}
}

impl<T: Scalar, const N: usize> Target for [T; N] {
	fn shape() -> Shape {
		Shape::Array {
			len: N,
			elem: T::KIND,
		}
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		let shape = Self::shape();
		let values = slot.values().map_or(&[][..], |entry| entry.values.as_slice());
		let kept = &values[values.len().saturating_sub(N)..];

		for (i, item) in self.iter_mut().enumerate() {
			let found = kept.get(i).map(Option::as_deref);
			if let Some(value) = slot.resolve(found, &shape)? {
				*item = value;
			}
		}
		Ok(())
	}
}

impl<K, V> Target for HashMap<K, V>
where
	K: Scalar + Eq + Hash,
	V: Target + Default,
{
	fn shape() -> Shape {
		Shape::Map {
			key: K::KIND,
			value: Box::new(V::shape()),
		}
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		if let Some(entries) = bind_entries::<K, V>(slot, &Self::shape())? {
			*self = entries.into_iter().collect();
		}
		Ok(())
	}
}

impl<K, V> Target for BTreeMap<K, V>
where
	K: Scalar + Ord,
	V: Target + Default,
{
	fn shape() -> Shape {
		Shape::Map {
			key: K::KIND,
			value: Box::new(V::shape()),
		}
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		if let Some(entries) = bind_entries::<K, V>(slot, &Self::shape())? {
			*self = entries.into_iter().collect();
		}
		Ok(())
	}
}

impl<R: Record> Target for R {
	fn shape() -> Shape {
		Shape::Record(short_type_name::<R>())
	}

	fn bind(&mut self, slot: &Slot<'_>) -> Result<(), BindError> {
		load_record(self, slot.config(), slot.path()).map_err(|source| BindError::Record {
			ty: Self::shape().to_string(),
			path: slot.path().to_string(),
			source,
		})
	}
}

fn short_type_name<T>() -> &'static str {
	let name = std::any::type_name::<T>();
	let base = name.split('<').next().unwrap_or(name);
	let start = base.rfind("::").map_or(0, |i| i + 2);
	&name[start..]
}

/// How a map's path splits into the section to walk and the key to read.
enum MapPath<'p> {
	/// `section` or `section.*`: each sub-section is a record.
	Records { section: &'p str },
	/// `section.*.key`: each sub-section contributes its `key`.
	Values { section: &'p str, key: &'p str },
}

fn map_path<'p>(path: &'p str, shape: &Shape, value: &Shape) -> Result<MapPath<'p>, BindError> {
	let invalid = |reason: &str| BindError::InvalidShape {
		ty: shape.to_string(),
		path: path.to_string(),
		reason: reason.to_string(),
	};

	match value {
		Shape::Map { .. } => Err(invalid("Map values cannot be other maps.")),
		Shape::Record(_) => {
			let section = path
				.strip_suffix(".*.")
				.or_else(|| path.strip_suffix(".*"))
				.unwrap_or(path);
			if section.is_empty() || section.contains(".*.") {
				return Err(invalid(
					"Key must be of form '<section>' or '<section>.*'. <section> must be non-zero length.",
				));
			}
			Ok(MapPath::Records { section })
		}
		_ => match path.split(".*.").collect::<Vec<_>>().as_slice() {
			[section, key] if !section.is_empty() && !key.is_empty() => {
				Ok(MapPath::Values { section, key })
			}
			_ => Err(invalid(
				"Key must be of form '<section>.*.<key>'. Both <section> and <key> must be non-zero length.",
			)),
		},
	}
}

/// Bind one map entry per sub-section of the section named by the path.
///
/// `None` means the section is absent and the map should be left alone.
fn bind_entries<K, V>(slot: &Slot<'_>, shape: &Shape) -> Result<Option<Vec<(K, V)>>, BindError>
where
	K: Scalar,
	V: Target + Default,
{
	let plan = map_path(slot.path(), shape, &V::shape())?;
	let section_name = match plan {
		MapPath::Records { section } | MapPath::Values { section, .. } => section,
	};

	let Some(section) = slot.config().section(section_name) else {
		if slot.required() {
			return Err(BindError::MissingSection {
				ty: shape.to_string(),
				path: slot.path().to_string(),
				section: section_name.to_string(),
			});
		}
		return Ok(None);
	};

	let mut entries = Vec::with_capacity(section.sub_sections.len());
	for (name, sub_section) in &section.sub_sections {
		let key = K::from_value(Some(name)).map_err(|source| BindError::SubSectionName {
			ty: shape.to_string(),
			path: slot.path().to_string(),
			name: name.clone(),
			source,
		})?;

		let value_slot = match plan {
			MapPath::Records { .. } => {
				Slot::namespace(slot.config(), format!("{section_name}.{name}"))
			}
			MapPath::Values { key: field, .. } => Slot {
				config: slot.config(),
				path: format!("{section_name}.{name}.{field}"),
				values: sub_section.values.get(field),
				required: slot.required(),
				default: slot.default(),
			},
		};

		let mut value = V::default();
		value
			.bind(&value_slot)
			.map_err(|source| BindError::SubSection {
				ty: shape.to_string(),
				path: slot.path().to_string(),
				name: name.clone(),
				source: Box::new(source),
			})?;
		entries.push((key, value));
	}
	Ok(Some(entries))
}
