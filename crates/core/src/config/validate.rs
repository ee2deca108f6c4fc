use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Relay poll interval is not 0
/// - Proxy discovery has at least one source and a positive limit
/// - Retry backoff multiplier is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.relay.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "relay.poll_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.proxy.sources.is_empty() {
        return Err(ConfigError::ValidationError(
            "proxy.sources cannot be empty".to_string(),
        ));
    }

    if config.proxy.limit == 0 {
        return Err(ConfigError::ValidationError(
            "proxy.limit cannot be 0".to_string(),
        ));
    }

    if config.fetcher.retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "fetcher.retry.backoff_multiplier cannot be below 1".to_string(),
        ));
    }

    Ok(())
}
