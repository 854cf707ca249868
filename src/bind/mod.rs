//! Binding parsed configuration into typed records.
//!
//! A record lists its fields once, in [`Record::describe`], and the binder
//! walks that description against a [`Config`]:
//!
//! ```
//! use gitcfg::{Config, Fields, Key, Record};
//!
//! #[derive(Default)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Record for User {
//!     fn describe(fields: &mut Fields<'_, Self>) {
//!         fields
//!             .field("name", Key::new("user.name").required(), |u| &mut u.name)
//!             .field("age", Key::new("user.age").default("18"), |u| &mut u.age);
//!     }
//! }
//!
//! let config: Config = "[user]\n\tname = Ada\n".parse().unwrap();
//! let user: User = config.bind().unwrap();
//! assert_eq!(user.name, "Ada");
//! assert_eq!(user.age, 18);
//! ```
//!
//! Every field is attempted; failures are collected into a [`LoadError`]
//! keyed by the field's full path.

pub mod duration;
pub mod scalar;
pub mod target;

pub use duration::{SignedDuration, parse_duration};
pub use scalar::{Scalar, ScalarKind};
pub use target::{Shape, Slot, Target};

use crate::config::key::join_key;
use crate::config::types::Config;
use crate::error::{FieldError, LoadError};
use tracing::debug;

/// A struct that can be populated from a [`Config`].
pub trait Record: Sized {
	/// Register every bindable field with `fields`.
	fn describe(fields: &mut Fields<'_, Self>);
}

/// Where a field's value lives and what happens when it is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
	path: String,
	required: bool,
	default: Option<String>,
}

impl Key {
	/// A key at `path`: `key`, `section.key`, `section.sub.key`, or for maps
	/// `section`, `section.*` and `section.*.key`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			required: false,
			default: None,
		}
	}

	/// Fail if no value is present. Any default is ignored.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Literal parsed in place of a missing value.
	pub fn default(mut self, literal: impl Into<String>) -> Self {
		self.default = Some(literal.into());
		self
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn is_required(&self) -> bool {
		self.required
	}
}

/// Binds the fields of one record, collecting failures as it goes.
pub struct Fields<'a, R> {
	record: &'a mut R,
	config: &'a Config,
	namespace: &'a str,
	errors: LoadError,
}

impl<R> Fields<'_, R> {
	/// Bind one field. A failure is recorded and binding carries on.
	pub fn field<T: Target>(
		&mut self,
		name: &'static str,
		key: Key,
		access: impl FnOnce(&mut R) -> &mut T,
	) -> &mut Self {
		let path = if self.namespace.is_empty() {
			key.path
		} else if key.path.is_empty() {
			self.namespace.to_string()
		} else {
			join_key(self.namespace, "", &key.path)
		};
		let slot = Slot::new(self.config, path, key.required, key.default.as_deref());

		if let Err(source) = access(&mut *self.record).bind(&slot) {
			let path = slot.into_path();
			debug!(field = name, %path, error = %source, "Field failed to bind");
			self.errors.insert(
				path,
				FieldError {
					field: name,
					ty: T::shape().to_string(),
					source,
				},
			);
		}
		self
	}
}

/// Bind `record` from `config`, prefixing every field path with `namespace`.
pub(crate) fn load_record<R: Record>(
	record: &mut R,
	config: &Config,
	namespace: &str,
) -> Result<(), LoadError> {
	let mut fields = Fields {
		record,
		config,
		namespace,
		errors: LoadError::new(),
	};
	R::describe(&mut fields);

	if fields.errors.is_empty() {
		Ok(())
	} else {
		Err(fields.errors)
	}
}

impl Config {
	/// Populate an existing record. Fields with no value and no policy keep
	/// what they held.
	pub fn load<R: Record>(&self, record: &mut R) -> Result<(), LoadError> {
		let result = load_record(record, self, "");
		if let Err(ref errors) = result {
			debug!(failures = errors.len(), "Record loaded with errors");
		}
		result
	}

	/// Populate a fresh `R::default()`.
	pub fn bind<R: Record + Default>(&self) -> Result<R, LoadError> {
		let mut record = R::default();
		self.load(&mut record)?;
		Ok(record)
	}
}
