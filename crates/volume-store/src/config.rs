//! Configuration for the volume store.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for opening and reading volume datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeStoreConfig {
    /// Memory budget for the in-memory brick cache in megabytes.
    pub brick_cache_size_mb: usize,

    /// Directory for the on-disk brick cache.
    ///
    /// Only used for datasets whose URL requests `cached=arco`; `None`
    /// disables on-disk caching entirely.
    pub cache_dir: Option<PathBuf>,

    /// Region passed to the object-storage client.
    pub region: String,

    /// Allow plain-HTTP endpoints (local object stores).
    pub allow_http: bool,
}

impl Default for VolumeStoreConfig {
    fn default() -> Self {
        Self {
            brick_cache_size_mb: 256,
            cache_dir: None,
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

impl VolumeStoreConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.brick_cache_size_mb == 0 {
            return Err("brick_cache_size_mb must be > 0".to_string());
        }
        Ok(())
    }

    /// Get the brick cache budget in bytes.
    pub fn brick_cache_size_bytes(&self) -> usize {
        self.brick_cache_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = VolumeStoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.brick_cache_size_bytes(), 256 * 1024 * 1024);
    }

    #[test]
    fn test_zero_cache_rejected() {
        let config = VolumeStoreConfig {
            brick_cache_size_mb: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
