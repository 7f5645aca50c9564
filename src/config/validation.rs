use crate::config::types::{CrawlConfig, CrawlerSettings};
use crate::{ConfigError, ConfigResult};

/// Upper bound on concurrent fetches
pub const MAX_CONCURRENCY: usize = 256;

/// Validates a run configuration
pub fn validate(config: &CrawlConfig) -> ConfigResult<()> {
    validate_root_url(config)?;
    validate_limits(config.max_pages, config.concurrency)?;

    if let Some(timeout) = config.fetch_timeout {
        if timeout.is_zero() {
            return Err(ConfigError::Validation(
                "fetch timeout must be greater than zero".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the values present in a settings file
pub fn validate_settings(settings: &CrawlerSettings) -> ConfigResult<()> {
    if let Some(max_pages) = settings.max_pages {
        validate_max_pages(max_pages)?;
    }

    if let Some(concurrency) = settings.concurrency {
        validate_concurrency(concurrency)?;
    }

    if settings.fetch_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the root URL: HTTP(S) with a host
fn validate_root_url(config: &CrawlConfig) -> ConfigResult<()> {
    let url = &config.root_url;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL '{}' must use HTTP or HTTPS",
            url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "root URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

fn validate_limits(max_pages: usize, concurrency: usize) -> ConfigResult<()> {
    validate_max_pages(max_pages)?;
    validate_concurrency(concurrency)
}

fn validate_max_pages(max_pages: usize) -> ConfigResult<()> {
    if max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            max_pages
        )));
    }
    Ok(())
}

fn validate_concurrency(concurrency: usize) -> ConfigResult<()> {
    if concurrency < 1 || concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, concurrency
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    fn create_test_config() -> CrawlConfig {
        CrawlConfig::new(Url::parse("http://example.com/").unwrap(), "./mirror")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_max_depth_zero_is_valid() {
        let config = create_test_config().with_max_depth(0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_max_pages() {
        let config = create_test_config().with_max_pages(0);
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_concurrency() {
        let config = create_test_config().with_concurrency(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_concurrency_upper_bound() {
        assert!(validate(&create_test_config().with_concurrency(MAX_CONCURRENCY)).is_ok());
        assert!(validate(&create_test_config().with_concurrency(MAX_CONCURRENCY + 1)).is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let config = create_test_config().with_fetch_timeout(Some(Duration::ZERO));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_root() {
        let mut config = create_test_config();
        config.root_url = Url::parse("ftp://example.com/").unwrap();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = CrawlerSettings::default();
        assert!(validate_settings(&settings).is_ok());

        settings.concurrency = Some(0);
        assert!(validate_settings(&settings).is_err());

        settings.concurrency = Some(4);
        settings.fetch_timeout_secs = Some(0);
        assert!(validate_settings(&settings).is_err());
    }
}
