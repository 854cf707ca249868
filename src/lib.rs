//! gitcfg - parse, query, write and bind git-config style files.
//!
//! This library provides:
//! - A line-driven parser with positioned errors
//! - A value store with dotted-key lookups and type coercion
//! - A serializer whose output parses back to the same store
//! - A binder that fills typed records, collecting every failure
//!
//! # Example
//!
//! ```
//! use gitcfg::parse_config_str;
//!
//! let config = parse_config_str("[remote \"origin\"]\n\turl = git@host:repo\n").unwrap();
//! assert_eq!(config.get_string("remote.origin.url"), Some("git@host:repo"));
//! ```

pub mod bind;
pub mod config;
pub mod error;

pub use bind::{Fields, Key, Record, Scalar, Shape, SignedDuration, Target};
pub use config::{
	Config, Parser, parse_config_file, parse_config_file_with, parse_config_str, parse_lines,
	parse_reader,
};
pub use error::{
	BindError, FieldError, GitcfgError, LoadError, ParseError, ParseErrorKind, Result, ValueError,
};
