/// A dotted key split into the scope it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionKey {
	/// Lowercased section, empty for base values.
	pub section: String,

	/// Sub-section exactly as written, empty if there is none.
	pub sub_section: String,

	/// Lowercased key name.
	pub key: String,
}

/// Split a key in the form `section.subsection.key`.
///
/// One `.` is taken as `section.key`, none as a bare key outside any
/// section. More than three parts keep everything between the first and the
/// last `.` as the sub-section, so `a.b.c.d` is sub-section `b.c` of `a`.
/// Section and key are lowercased, the sub-section is not.
pub fn parse_section_key(full_key: &str) -> SectionKey {
	let parts: Vec<&str> = full_key.split('.').collect();
	let (section, sub_section, key) = match parts.as_slice() {
		[key] => ("", String::new(), *key),
		[section, key] => (*section, String::new(), *key),
		[section, middle @ .., key] => (*section, middle.join("."), *key),
		[] => ("", String::new(), ""),
	};
	SectionKey {
		section: section.to_lowercase(),
		sub_section,
		key: key.to_lowercase(),
	}
}

/// Join scope parts back into a dotted key.
pub(crate) fn join_key(section: &str, sub_section: &str, key: &str) -> String {
	match (section.is_empty(), sub_section.is_empty()) {
		(true, _) => key.to_string(),
		(false, true) => format!("{section}.{key}"),
		(false, false) => format!("{section}.{sub_section}.{key}"),
	}
}
