//! Dataset URL resolution.
//!
//! Production datasets are addressed by a single URL that embeds everything
//! needed to reach them: the object-storage endpoint, credentials, the
//! location of the dataset within the store, and the caching mode, e.g.
//!
//! ```text
//! https://maritime.sealstorage.io/api/v0/s3/utah/nasa/dyamond/mit_output/llc2160_u
//!     ?access_key=any&secret_key=any
//!     &endpoint_url=https://maritime.sealstorage.io/api/v0/s3
//!     &cached=arco
//! ```
//!
//! When `endpoint_url` is present, the dataset location is the URL path with
//! the endpoint's path prefix stripped. The first segment of the location is
//! the bucket; the rest is the dataset prefix.

use url::Url;

use crate::error::{Result, VolumeStoreError};

/// Local caching mode requested by a dataset URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// No on-disk caching; every brick miss goes to the remote store.
    #[default]
    None,
    /// Analysis-ready cloud-optimized mode: fetched bricks are persisted
    /// to the local disk cache.
    Arco,
}

/// A fully resolved dataset URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetUrl {
    /// Object-storage endpoint, e.g. `https://maritime.sealstorage.io/api/v0/s3`.
    pub endpoint: String,
    /// Bucket name.
    pub bucket: String,
    /// Dataset prefix within the bucket (root of the level pyramid).
    pub prefix: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Requested caching mode.
    pub cache_mode: CacheMode,
}

impl DatasetUrl {
    /// Parse a dataset URL into its storage components.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| VolumeStoreError::invalid_url(format!("{raw}: {e}")))?;

        let mut access_key_id = None;
        let mut secret_access_key = None;
        let mut endpoint_url = None;
        let mut cache_mode = CacheMode::None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "access_key" => access_key_id = Some(value.into_owned()),
                "secret_key" => secret_access_key = Some(value.into_owned()),
                "endpoint_url" => endpoint_url = Some(value.into_owned()),
                "cached" => {
                    cache_mode = match value.as_ref() {
                        "arco" => CacheMode::Arco,
                        "none" => CacheMode::None,
                        other => {
                            return Err(VolumeStoreError::invalid_url(format!(
                                "unknown cached mode: {other}"
                            )))
                        }
                    }
                }
                _ => {}
            }
        }

        let access_key_id = access_key_id
            .ok_or_else(|| VolumeStoreError::invalid_url("missing access_key"))?;
        let secret_access_key = secret_access_key
            .ok_or_else(|| VolumeStoreError::invalid_url("missing secret_key"))?;

        let host = url
            .host_str()
            .ok_or_else(|| VolumeStoreError::invalid_url("missing host"))?;

        // The dataset location is the URL path, minus the endpoint's own path
        // prefix when an explicit endpoint is given.
        let (endpoint, location) = match endpoint_url {
            Some(endpoint) => {
                let parsed = Url::parse(&endpoint)
                    .map_err(|e| VolumeStoreError::invalid_url(format!("endpoint_url: {e}")))?;
                let endpoint_path = parsed.path().trim_end_matches('/');
                let location = url
                    .path()
                    .strip_prefix(endpoint_path)
                    .unwrap_or_else(|| url.path());
                (endpoint.trim_end_matches('/').to_string(), location.to_string())
            }
            None => {
                let mut endpoint = format!("{}://{}", url.scheme(), host);
                if let Some(port) = url.port() {
                    endpoint.push_str(&format!(":{port}"));
                }
                (endpoint, url.path().to_string())
            }
        };

        let location = location.trim_matches('/');
        let (bucket, prefix) = location
            .split_once('/')
            .ok_or_else(|| {
                VolumeStoreError::invalid_url(format!("no dataset prefix in path: {location}"))
            })?;

        if bucket.is_empty() || prefix.is_empty() {
            return Err(VolumeStoreError::invalid_url(format!(
                "no dataset prefix in path: {location}"
            )));
        }

        Ok(Self {
            endpoint,
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            access_key_id,
            secret_access_key,
            cache_mode,
        })
    }

    /// Stable identifier for this dataset, used for cache keying.
    pub fn cache_id(&self) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U_URL: &str = "https://maritime.sealstorage.io/api/v0/s3/utah/nasa/dyamond/mit_output/llc2160_u?access_key=any&secret_key=any&endpoint_url=https://maritime.sealstorage.io/api/v0/s3&cached=arco";

    #[test]
    fn test_parse_production_url() {
        let parsed = DatasetUrl::parse(U_URL).unwrap();
        assert_eq!(parsed.endpoint, "https://maritime.sealstorage.io/api/v0/s3");
        assert_eq!(parsed.bucket, "utah");
        assert_eq!(parsed.prefix, "nasa/dyamond/mit_output/llc2160_u");
        assert_eq!(parsed.access_key_id, "any");
        assert_eq!(parsed.secret_access_key, "any");
        assert_eq!(parsed.cache_mode, CacheMode::Arco);
    }

    #[test]
    fn test_parse_without_endpoint_url() {
        let parsed = DatasetUrl::parse(
            "http://localhost:9000/ocean/llc2160_w?access_key=k&secret_key=s",
        )
        .unwrap();
        assert_eq!(parsed.endpoint, "http://localhost:9000");
        assert_eq!(parsed.bucket, "ocean");
        assert_eq!(parsed.prefix, "llc2160_w");
        assert_eq!(parsed.cache_mode, CacheMode::None);
    }

    #[test]
    fn test_missing_credentials() {
        let err = DatasetUrl::parse("https://example.com/bucket/data?secret_key=s").unwrap_err();
        assert!(matches!(err, VolumeStoreError::InvalidUrl(_)));
        assert!(err.to_string().contains("access_key"));
    }

    #[test]
    fn test_unknown_cache_mode() {
        let err = DatasetUrl::parse(
            "https://example.com/bucket/data?access_key=a&secret_key=s&cached=lossy",
        )
        .unwrap_err();
        assert!(err.to_string().contains("lossy"));
    }

    #[test]
    fn test_missing_prefix() {
        let err =
            DatasetUrl::parse("https://example.com/bucketonly?access_key=a&secret_key=s")
                .unwrap_err();
        assert!(matches!(err, VolumeStoreError::InvalidUrl(_)));
    }

    #[test]
    fn test_cache_id_distinguishes_datasets() {
        let u = DatasetUrl::parse(U_URL).unwrap();
        let w = DatasetUrl::parse(&U_URL.replace("llc2160_u", "llc2160_w")).unwrap();
        assert_ne!(u.cache_id(), w.cache_id());
    }
}
