use crate::config::types::Config;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads a configuration file and hashes its content
///
/// The file is read once; the hash covers exactly the text that was parsed.
/// The configuration is not validated, so callers can merge command-line
/// overrides first and then call `validate`.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok((Config, String))` - Parsed configuration and hex SHA-256 of the file
/// * `Err(ConfigError)` - Failed to read or parse the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use onion_lens::config::{read_config, validate};
///
/// let (config, hash) = read_config(Path::new("onion-lens.toml")).unwrap();
/// validate(&config).unwrap();
/// println!("Workers: {} (config {})", config.crawler.workers, hash);
/// ```
pub fn read_config(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
}

/// Parses configuration from TOML text without validating it
///
/// Missing sections and keys fall back to their defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Computes the hex-encoded SHA-256 hash of configuration text
///
/// Logged at startup so a run's output can be tied back to the exact
/// configuration that produced it.
pub fn config_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
