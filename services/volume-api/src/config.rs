//! Service configuration.

use std::path::PathBuf;

use volume_store::VolumeStoreConfig;

// LLC2160 data
const U_URL: &str = "https://maritime.sealstorage.io/api/v0/s3/utah/nasa/dyamond/mit_output/llc2160_u?access_key=any&secret_key=any&endpoint_url=https://maritime.sealstorage.io/api/v0/s3&cached=arco";
const W_URL: &str = "https://maritime.sealstorage.io/api/v0/s3/utah/nasa/dyamond/mit_output/llc2160_w?access_key=any&secret_key=any&endpoint_url=https://maritime.sealstorage.io/api/v0/s3&cached=arco";
const V_URL: &str = "https://maritime.sealstorage.io/api/v0/s3/utah/nasa/dyamond/mit_output/llc2160_v?access_key=any&secret_key=any&endpoint_url=https://maritime.sealstorage.io/api/v0/s3&cached=arco";

/// Configuration for the volume API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Dataset URL for the u velocity component.
    pub u_url: String,
    /// Dataset URL for the w velocity component.
    pub w_url: String,
    /// Dataset URL for the v velocity component.
    pub v_url: String,
    /// Directory for the on-disk brick cache.
    pub cache_dir: PathBuf,
    /// Memory budget for each dataset's brick cache, in megabytes.
    pub brick_cache_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            u_url: U_URL.to_string(),
            w_url: W_URL.to_string(),
            v_url: V_URL.to_string(),
            cache_dir: PathBuf::from("./volume_tile_cache"),
            brick_cache_mb: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to the
    /// production LLC2160 datasets.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            u_url: std::env::var("OCEAN_U_URL").unwrap_or(defaults.u_url),
            w_url: std::env::var("OCEAN_W_URL").unwrap_or(defaults.w_url),
            v_url: std::env::var("OCEAN_V_URL").unwrap_or(defaults.v_url),
            cache_dir: std::env::var("OCEAN_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            brick_cache_mb: std::env::var("OCEAN_BRICK_CACHE_MB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.brick_cache_mb),
        }
    }

    /// The store configuration shared by the three datasets.
    pub fn store_config(&self) -> VolumeStoreConfig {
        VolumeStoreConfig {
            brick_cache_size_mb: self.brick_cache_mb,
            cache_dir: Some(self.cache_dir.clone()),
            ..VolumeStoreConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volume_store::DatasetUrl;

    #[test]
    fn test_default_urls_resolve() {
        let config = ServerConfig::default();
        for url in [&config.u_url, &config.w_url, &config.v_url] {
            DatasetUrl::parse(url).unwrap();
        }
    }

    #[test]
    fn test_default_urls_are_distinct_datasets() {
        let config = ServerConfig::default();
        let u = DatasetUrl::parse(&config.u_url).unwrap();
        let w = DatasetUrl::parse(&config.w_url).unwrap();
        let v = DatasetUrl::parse(&config.v_url).unwrap();

        assert_ne!(u.prefix, w.prefix);
        assert_ne!(u.prefix, v.prefix);
        assert_ne!(w.prefix, v.prefix);
    }

    #[test]
    fn test_store_config_carries_cache_dir() {
        let config = ServerConfig::default();
        let store = config.store_config();
        assert_eq!(store.cache_dir, Some(config.cache_dir));
        assert_eq!(store.brick_cache_size_mb, 256);
    }
}
