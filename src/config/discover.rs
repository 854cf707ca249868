use crate::config::parser::parse_config_file;
use crate::config::types::Config;
use crate::error::{GitcfgError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(GitcfgError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(".gitconfig"))
}

/// Load the user's ~/.gitconfig if it exists.
pub fn load_user_config() -> Result<Option<Config>> {
	load_optional(&user_config_path()?)
}

fn load_optional(path: &Path) -> Result<Option<Config>> {
	match parse_config_file(path) {
		Ok(config) => Ok(Some(config)),
		Err(GitcfgError::ConfigNotFound { path }) => {
			debug!(path = %path.display(), "No user config");
			Ok(None)
		}
		Err(e) => Err(e),
	}
}
