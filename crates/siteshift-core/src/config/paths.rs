//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "siteshift";
pub const CONFIG_FILE_NAME: &str = "siteshift.toml";

/// `<config_dir>/siteshift/siteshift.toml`
pub fn config_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Default config file location for the current user, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| config_path_in(&dir))
}
