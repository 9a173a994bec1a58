//! Default locations under the user's home directory

use std::path::PathBuf;

/// Data directory (~/.mayaguide), or `.mayaguide` when no home is known
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".mayaguide"))
        .unwrap_or_else(|| PathBuf::from(".mayaguide"))
}

/// Configuration file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default content file location
pub fn content_path() -> PathBuf {
    data_dir().join("content.json")
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
