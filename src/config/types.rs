use std::collections::BTreeMap;

/// A parsed configuration: values outside any section plus the sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	/// Sections keyed by lowercased name.
	pub sections: BTreeMap<String, Section>,

	/// Values that appeared before any section header.
	pub base_values: ValueSet,
}

/// A `[section]`, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
	/// Lowercased name used for matching.
	pub name: String,

	/// Name as first written, used when emitting.
	pub orig_case_name: String,

	/// Sub-sections keyed by their exact, case-sensitive name.
	pub sub_sections: BTreeMap<String, SubSection>,

	/// Values declared directly in the section.
	pub values: ValueSet,
}

/// A `[section "sub-section"]`, matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubSection {
	pub name: String,
	pub values: ValueSet,
}

/// Every value assigned to one key within one scope, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
	/// Lowercased key.
	pub name: String,

	/// Key as first written.
	pub orig_case_name: String,

	/// One entry per assignment. `None` is a bare key with no `=`.
	pub values: Vec<Option<String>>,
}

/// Keys of one scope, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueSet {
	entries: BTreeMap<String, ConfigValue>,
}

impl Config {
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up a section by name, ignoring case.
	pub fn section(&self, name: &str) -> Option<&Section> {
		self.sections.get(&name.to_lowercase())
	}

	pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
		self.sections.get_mut(&name.to_lowercase())
	}

	/// Look up a section, creating it if it isn't there yet.
	///
	/// The original case of the name is only recorded on creation.
	pub fn section_entry(&mut self, name: &str) -> &mut Section {
		let lowered = name.to_lowercase();
		self.sections
			.entry(lowered.clone())
			.or_insert_with(|| Section::new(lowered, name.to_string()))
	}

	pub fn sub_section(&self, section: &str, sub_section: &str) -> Option<&SubSection> {
		self.section(section)?.sub_sections.get(sub_section)
	}

	pub fn sub_section_entry(&mut self, section: &str, sub_section: &str) -> &mut SubSection {
		self.section_entry(section).sub_section_entry(sub_section)
	}

	/// The value set for a scope: the base values when `section` is empty,
	/// the section's own values when `sub_section` is empty.
	pub fn value_set(&self, section: &str, sub_section: &str) -> Option<&ValueSet> {
		if section.is_empty() {
			return Some(&self.base_values);
		}
		let section = self.section(section)?;
		if sub_section.is_empty() {
			return Some(&section.values);
		}
		section.sub_sections.get(sub_section).map(|s| &s.values)
	}

	fn value_set_entry(&mut self, section: &str, sub_section: &str) -> &mut ValueSet {
		if section.is_empty() {
			return &mut self.base_values;
		}
		if sub_section.is_empty() {
			return &mut self.section_entry(section).values;
		}
		&mut self.sub_section_entry(section, sub_section).values
	}

	/// Append a value to `key` in the given scope, creating whatever is missing.
	///
	/// This is the same path the parser records assignments through.
	pub fn add_key_value(
		&mut self,
		section: &str,
		sub_section: &str,
		key: &str,
		value: Option<String>,
	) {
		self.value_set_entry(section, sub_section)
			.entry(key)
			.values
			.push(value);
	}

	/// True if nothing has been stored at all.
	pub fn is_empty(&self) -> bool {
		self.base_values.is_empty()
			&& self.sections.values().all(|section| {
				section.values.is_empty()
					&& section.sub_sections.values().all(|sub| sub.values.is_empty())
			})
	}
}

impl Section {
	fn new(name: String, orig_case_name: String) -> Self {
		Self {
			name,
			orig_case_name,
			sub_sections: BTreeMap::new(),
			values: ValueSet::default(),
		}
	}

	pub fn sub_section(&self, name: &str) -> Option<&SubSection> {
		self.sub_sections.get(name)
	}

	pub fn sub_section_entry(&mut self, name: &str) -> &mut SubSection {
		self.sub_sections
			.entry(name.to_string())
			.or_insert_with(|| SubSection {
				name: name.to_string(),
				values: ValueSet::default(),
			})
	}
}

impl SubSection {
	pub fn get(&self, key: &str) -> Option<&ConfigValue> {
		self.values.get(key)
	}
}

impl ValueSet {
	/// Look up a key, ignoring case. Keys without values are not found.
	pub fn get(&self, key: &str) -> Option<&ConfigValue> {
		self.entries
			.get(&key.to_lowercase())
			.filter(|value| value.has_values())
	}

	pub(crate) fn entry(&mut self, key: &str) -> &mut ConfigValue {
		let lowered = key.to_lowercase();
		self.entries
			.entry(lowered.clone())
			.or_insert_with(|| ConfigValue {
				name: lowered,
				orig_case_name: key.to_string(),
				values: Vec::new(),
			})
	}

	pub fn iter(&self) -> impl Iterator<Item = &ConfigValue> {
		self.entries.values().filter(|value| value.has_values())
	}

	pub fn len(&self) -> usize {
		self.iter().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl ConfigValue {
	pub fn has_values(&self) -> bool {
		!self.values.is_empty()
	}

	pub fn count(&self) -> usize {
		self.values.len()
	}

	/// The last value assigned, `None` if the last assignment was a bare key.
	pub fn last(&self) -> Option<&str> {
		self.values.last().and_then(|value| value.as_deref())
	}
}
