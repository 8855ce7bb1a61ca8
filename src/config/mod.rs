//! Configuration module for Onion-Lens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use onion_lens::config::{read_config, validate};
//! use std::path::Path;
//!
//! let (config, _hash) = read_config(Path::new("onion-lens.toml")).unwrap();
//! validate(&config).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, ProxyConfig, RendererConfig};

// Re-export parser functions
pub use parser::{config_hash, parse_config, read_config};
pub use validation::validate;
