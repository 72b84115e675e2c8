use std::fs;
use std::path::{Path, PathBuf};

use crate::io::vault::STATE_DIR;
use crate::model::config::TickmarkConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not serialize config.toml: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join("config.toml")
}

/// Walk up from `start` looking for a directory holding `.tickmark/config.toml`.
pub fn discover_vault(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if config_path(&current).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load the vault config. A missing file means all defaults.
pub fn load_config(root: &Path) -> Result<TickmarkConfig, ConfigError> {
    let path = config_path(root);
    if !path.exists() {
        return Ok(TickmarkConfig::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Write the default config into `root`, returning the file written.
pub fn write_default_config(root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
    let path = config_path(root);
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path));
    }
    fs::create_dir_all(root.join(STATE_DIR))?;
    let text = toml::to_string_pretty(&TickmarkConfig::default())?;
    fs::write(&path, text)?;
    Ok(path)
}
