//! Configuration module for Site-Snapshot
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is equivalent to loading
//! an empty one.
//!
//! # Example
//!
//! ```no_run
//! use site_snapshot::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("snapshot.toml")).unwrap();
//! println!("Navigation timeout: {:?}", config.timeouts.navigation());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, ImageConfig, TimeoutConfig, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
