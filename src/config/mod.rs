//! Reading, querying and writing git-config style files.
//!
//! This module handles:
//! - Parsing text into a [`Config`] value store
//! - Dotted-key lookups with type coercion
//! - Rendering a store back to text
//! - Locating the user's `~/.gitconfig`

pub mod discover;
pub mod key;
pub mod lookup;
pub mod parser;
pub mod types;
pub mod writer;

pub use discover::{load_user_config, user_config_path};
pub use key::{SectionKey, parse_section_key};
pub use parser::{
	Parser, parse_config_file, parse_config_file_with, parse_config_str, parse_lines, parse_reader,
};
pub use types::{Config, ConfigValue, Section, SubSection, ValueSet};
pub use writer::escape_value;
