use crate::config::types::{CrawlerSettings, SettingsFile};
use crate::config::validation::validate_settings;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a settings file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML settings file
///
/// # Returns
///
/// * `Ok(CrawlerSettings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - Failed to load, parse, or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_mirror::config::load_settings;
///
/// let settings = load_settings(Path::new("mirror.toml")).unwrap();
/// println!("Max depth: {:?}", settings.max_depth);
/// ```
pub fn load_settings(path: &Path) -> ConfigResult<CrawlerSettings> {
    let content = std::fs::read_to_string(path)?;

    let file: SettingsFile = toml::from_str(&content)?;

    validate_settings(&file.crawler)?;

    Ok(file.crawler)
}

/// Computes a SHA-256 hash of the settings file content
///
/// Logged at startup so two runs can be checked for identical settings.
pub fn compute_settings_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads settings and returns them together with the file hash
pub fn load_settings_with_hash(path: &Path) -> ConfigResult<(CrawlerSettings, String)> {
    let settings = load_settings(path)?;
    let hash = compute_settings_hash(path)?;
    Ok((settings, hash))
}
