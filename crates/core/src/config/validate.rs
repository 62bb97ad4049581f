use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Store concurrency and timeout are positive
/// - Page size and cache TTL are positive
/// - Site label is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.store.max_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "store.max_concurrency cannot be 0".to_string(),
        ));
    }

    if config.store.query_timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "store.query_timeout_ms cannot be 0".to_string(),
        ));
    }

    if config.search.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "search.page_size cannot be 0".to_string(),
        ));
    }

    if config.search.cache_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "search.cache_ttl_secs cannot be 0".to_string(),
        ));
    }

    if config.search.site.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "search.site cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_page_size_zero_fails() {
        let mut config = Config::default();
        config.search.page_size = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let mut config = Config::default();
        config.store.max_concurrency = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_blank_site_fails() {
        let mut config = Config::default();
        config.search.site = "   ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
