//! Onion-Lens: an anonymized snapshot crawler
//!
//! This crate visits a fixed list of destinations through a Tor SOCKS proxy,
//! renders each one in a headless browser, and stores the markup, a full-page
//! screenshot and the outbound links of every page it manages to load.

pub mod anonymity;
pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod state;
pub mod target;

use std::path::PathBuf;
use thiserror::Error;

pub use render::RenderError;

/// Main error type for Onion-Lens operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Not connected to Tor, refusing to crawl")]
    VerificationFailed,

    #[error("Failed to read targets file {}: {source}", path.display())]
    TargetSource {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Targets file {} contains no destinations", path.display())]
    NoTargets { path: PathBuf },

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Failed to write {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Onion-Lens operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::TaskStatus;
pub use target::{safe_name, Destination};
