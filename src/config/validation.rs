use crate::config::types::{BrowserConfig, Config, CrawlerConfig, ImageConfig, TimeoutConfig};
use crate::ConfigError;
use std::path::{Component, Path};

/// Largest accepted window or thumbnail edge, in pixels
const MAX_DIMENSION: u32 = 4096;

/// Upper bound on concurrent browser processes
const MAX_SESSIONS: u32 = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_browser_config(&config.browser)?;
    validate_timeout_config(&config.timeouts)?;
    validate_image_config(&config.images)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    validate_dimension("window-width", config.window_width)?;
    validate_dimension("window-height", config.window_height)?;

    if let Some(executable) = &config.executable {
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates timeouts; only the settle delay may be zero
fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("launch-ms", config.launch_ms),
        ("navigation-ms", config.navigation_ms),
        ("capture-ms", config.capture_ms),
        ("close-ms", config.close_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be greater than 0",
                name
            )));
        }
    }

    Ok(())
}

/// Validates image configuration
fn validate_image_config(config: &ImageConfig) -> Result<(), ConfigError> {
    validate_dimension("thumbnail-width", config.thumbnail_width)?;
    validate_dimension("thumbnail-height", config.thumbnail_height)?;

    if config.public_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "public-root cannot be empty".to_string(),
        ));
    }

    validate_image_directory(&config.directory)
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_sessions < 1 || config.max_concurrent_sessions > MAX_SESSIONS {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-sessions must be between 1 and {}, got {}",
            MAX_SESSIONS, config.max_concurrent_sessions
        )));
    }

    Ok(())
}

fn validate_dimension(name: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_DIMENSION, value
        )));
    }
    Ok(())
}

/// The image directory becomes part of public paths, so it must stay relative
/// and inside the public root.
fn validate_image_directory(directory: &str) -> Result<(), ConfigError> {
    if directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "images directory cannot be empty".to_string(),
        ));
    }

    let path = Path::new(directory);
    if path.is_absolute() || directory.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "images directory '{}' must be relative to the public root",
            directory
        )));
    }

    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(ConfigError::Validation(format!(
            "images directory '{}' cannot leave the public root",
            directory
        )));
    }

    Ok(())
}
