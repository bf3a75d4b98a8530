//! Configuration loading and validation

use crate::core::error::{ConfigError, EstateResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration
///
/// ```yaml
/// cache:
///   enabled: true
///   ttl_seconds: 300
/// paging:
///   default_page_size: 15
///   max_page_size: 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstateConfig {
    pub cache: CacheConfig,
    pub paging: PagingConfig,
}

/// Snapshot cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When disabled every read goes to the data source
    pub enabled: bool,

    /// Lifetime of a snapshot, in seconds
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 300,
        }
    }
}

/// Paging limits applied to incoming query requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: crate::core::query::DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

impl EstateConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> EstateResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> EstateResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EstateResult<()> {
        if self.cache.enabled && self.cache.ttl_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.ttl_seconds".to_string(),
                message: "must be greater than 0 when the cache is enabled".to_string(),
            }
            .into());
        }
        if self.paging.max_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "paging.max_page_size".to_string(),
                message: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.paging.default_page_size > self.paging.max_page_size {
            return Err(ConfigError::InvalidValue {
                key: "paging.default_page_size".to_string(),
                message: format!(
                    "{} exceeds max_page_size {}",
                    self.paging.default_page_size, self.paging.max_page_size
                ),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EstateError;

    #[test]
    fn test_defaults() {
        let config = EstateConfig::default();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 300);
        assert_eq!(config.paging.default_page_size, 15);
        assert_eq!(config.paging.max_page_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EstateConfig::from_yaml_str("cache:\n  ttl_seconds: 60\n").unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.paging, PagingConfig::default());
    }

    #[test]
    fn test_empty_yaml() {
        let config = EstateConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EstateConfig::default());
    }

    #[test]
    fn test_zero_ttl_rejected_only_when_enabled() {
        let err = EstateConfig::from_yaml_str("cache:\n  ttl_seconds: 0\n").unwrap_err();
        assert!(matches!(
            err,
            EstateError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "cache.ttl_seconds"
        ));

        let config =
            EstateConfig::from_yaml_str("cache:\n  enabled: false\n  ttl_seconds: 0\n").unwrap();
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_default_page_size_over_max() {
        let yaml = "paging:\n  default_page_size: 50\n  max_page_size: 20\n";
        let err = EstateConfig::from_yaml_str(yaml).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = EstateConfig::from_yaml_str("cache: [").unwrap_err();
        assert!(matches!(err, EstateError::Config(ConfigError::ParseError { .. })));
    }
}
