use crate::error::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

/// File name shared by the project-local and global config files.
pub const CONFIG_FILE_NAME: &str = "devflow.json";

/// Base devflow config directory (universal ~/.config/devflow/ on all platforms)
pub fn devflow() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("devflow"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("devflow"))
    }
}

/// Global devflow.json config file path
pub fn global_config() -> Result<PathBuf> {
    Ok(devflow()?.join(CONFIG_FILE_NAME))
}

/// Project-local devflow.json in the given directory
pub fn project_config(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` in a configured path.
pub fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}
