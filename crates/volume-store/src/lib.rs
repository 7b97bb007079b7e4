//! Multiresolution Ocean Volume Access
//!
//! This crate provides read access to large 4D ocean-simulation volumes
//! (time, depth, y, x) stored as Zarr pyramids in remote object storage.
//! It enables:
//!
//! - **Partial reads**: Only fetch the bricks needed for a sub-volume request
//! - **Progressive quality**: Coarser pyramid levels for cheap previews
//! - **Layered caching**: LRU cache for decoded bricks, plus an on-disk
//!   cache for `cached=arco` datasets
//!
//! # Architecture
//!
//! ```text
//! VolumeQuery (time, z, y, x, quality)
//!      │
//!      ▼
//! VolumeReader::read(query)
//!      │
//!      ├─► Select pyramid level from quality
//!      │
//!      ├─► Calculate needed bricks (O(1) arithmetic)
//!      │
//!      ├─► For each brick: memory cache → disk cache → remote fetch
//!      │
//!      └─► Assemble bricks into a SubVolume
//! ```
//!
//! # Example
//!
//! ```ignore
//! use volume_store::{VolumeQuery, VolumeReader, VolumeStoreConfig, ZarrVolumeDataset};
//!
//! // Open a dataset from its production URL
//! let dataset = ZarrVolumeDataset::open_url(&url, &VolumeStoreConfig::default())?;
//!
//! // Read a sub-volume
//! let sub = dataset.read(&VolumeQuery::default()).await?;
//! println!("{:?}: {} samples", sub.shape, sub.num_values());
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod query;
pub mod store;
pub mod types;
pub mod url;

// Re-export commonly used types at crate root
pub use cache::{BrickCache, BrickKey, DiskBrickCache};
pub use config::VolumeStoreConfig;
pub use dataset::{VolumeReader, ZarrVolumeDataset};
pub use error::{Result, VolumeStoreError};
pub use query::{AxisSelection, IndexRange, VolumeQuery};
pub use store::{create_remote_storage, RemoteStorage};
pub use types::{CacheStats, SubVolume, VolumeMetadata};
pub use url::{CacheMode, DatasetUrl};
