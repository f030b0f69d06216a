//! Cache configuration.
//!
//! Controls the per-locale message cache via `lingora.toml`.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;

/// Message cache configuration from `lingora.toml`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Enable the in-memory message cache.
    pub enabled: bool,
    /// Maximum age of a cached tree before it is rebuilt.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: settings.ttl,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    /// A configuration that never serves from cache.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(300));
    }

    #[test]
    fn disabled_keeps_default_ttl() {
        let config = CacheConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(300));
    }

    #[test]
    fn built_from_validated_settings() {
        let settings = crate::config::CacheSettings {
            enabled: false,
            ttl: Duration::from_secs(42),
        };
        let config = CacheConfig::from(&settings);
        assert!(!config.enabled);
        assert_eq!(config.ttl, Duration::from_secs(42));
    }
}
