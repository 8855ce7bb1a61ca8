use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxyConfig, RendererConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_proxy_config(&config.proxy)?;
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    validate_socket_address(&config.address)?;

    let check_url = Url::parse(&config.check_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid check_url: {}", e)))?;

    if check_url.scheme() != "http" && check_url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "check_url must use http or https, got '{}'",
            check_url.scheme()
        )));
    }

    if config.check_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "check_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates worker pool configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.task_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "task_timeout_secs must be >= 1, got {}",
            config.task_timeout_secs
        )));
    }

    Ok(())
}

/// Validates headless browser configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if config.screenshot_quality > 100 {
        return Err(ConfigError::Validation(format!(
            "screenshot_quality must be between 0 and 100, got {}",
            config.screenshot_quality
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation("output root cannot be empty".to_string()));
    }

    if config.log_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("log_path cannot be empty".to_string()));
    }

    if config.targets_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "targets_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that an address has the `host:port` shape
fn validate_socket_address(address: &str) -> Result<(), ConfigError> {
    let (host, port) = address.rsplit_once(':').ok_or_else(|| {
        ConfigError::Validation(format!(
            "proxy address must be host:port, got '{}'",
            address
        ))
    })?;

    if host.is_empty() {
        return Err(ConfigError::Validation(format!(
            "proxy address is missing a host: '{}'",
            address
        )));
    }

    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "proxy address has an invalid port: '{}'",
            address
        ))),
    }
}
