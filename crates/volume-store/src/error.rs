//! Error types for volume access.

use thiserror::Error;

/// Errors that can occur while opening or reading a volume dataset.
#[derive(Error, Debug)]
pub enum VolumeStoreError {
    /// Failed to open the dataset.
    #[error("failed to open dataset: {0}")]
    OpenFailed(String),

    /// Failed to read volume data.
    #[error("failed to read volume data: {0}")]
    ReadFailed(String),

    /// The dataset URL could not be resolved.
    #[error("invalid dataset url: {0}")]
    InvalidUrl(String),

    /// The query selects nothing readable.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The requested indices lie outside the dataset extent.
    #[error("requested {requested} is outside dataset extent {extent}")]
    OutOfBounds { requested: String, extent: String },

    /// Invalid metadata in the dataset.
    #[error("invalid dataset metadata: {0}")]
    InvalidMetadata(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Brick cache error.
    #[error("cache error: {0}")]
    CacheError(String),
}

impl VolumeStoreError {
    /// Create an OpenFailed error.
    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::OpenFailed(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create an InvalidQuery error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create an OutOfBounds error.
    pub fn out_of_bounds(requested: impl Into<String>, extent: impl Into<String>) -> Self {
        Self::OutOfBounds {
            requested: requested.into(),
            extent: extent.into(),
        }
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a StorageError.
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    /// Create a CacheError.
    pub fn cache_error(msg: impl Into<String>) -> Self {
        Self::CacheError(msg.into())
    }
}

impl From<std::io::Error> for VolumeStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for VolumeStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Result type for volume store operations.
pub type Result<T> = std::result::Result<T, VolumeStoreError>;
