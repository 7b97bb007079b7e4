//! Multiresolution volume dataset implementation.

use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;
use zarrs::array::Array;
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

use crate::cache::{hash_dataset_id, BrickCache, DiskBrickCache};
use crate::config::VolumeStoreConfig;
use crate::error::{Result, VolumeStoreError};
use crate::query::VolumeQuery;
use crate::store::{create_remote_storage, RemoteStorage};
use crate::types::{CacheStats, SubVolume, VolumeMetadata};
use crate::url::{CacheMode, DatasetUrl};

/// Trait for reading sub-volumes of a multiresolution dataset.
///
/// This trait abstracts over the storage backing a dataset and is the
/// handle type services hold for the lifetime of the process.
#[async_trait]
pub trait VolumeReader: Send + Sync {
    /// Read a sub-volume.
    ///
    /// Resolves the query's quality to a pyramid level, clamps the axis
    /// selections to the level extent, and fetches only the bricks that
    /// intersect the selection.
    async fn read(&self, query: &VolumeQuery) -> Result<SubVolume>;

    /// Get metadata about the dataset.
    fn metadata(&self) -> &VolumeMetadata;

    /// Get brick cache statistics for monitoring.
    fn cache_stats(&self) -> CacheStats;
}

/// Volume dataset stored as a pyramid of Zarr arrays.
///
/// A dataset prefix holds arrays `level_0 .. level_{n-1}`, each 4-dimensional
/// `[time, depth, y, x]`. Reads work brick-by-brick:
/// 1. Calculate which bricks intersect the requested subset
/// 2. Fetch each through the cache hierarchy (memory, disk, remote)
/// 3. Assemble the bricks into one contiguous sub-volume
pub struct ZarrVolumeDataset<S: ReadableStorageTraits> {
    /// One Zarr array per pyramid level, coarsest last.
    levels: Vec<Array<S>>,
    /// Extents `[time, depth, y, x]` per level.
    level_shapes: Vec<[u64; 4]>,
    /// Brick extents per level.
    level_chunk_shapes: Vec<[u64; 4]>,
    /// Hash of the dataset identifier for cache keys.
    dataset_hash: u64,
    /// Dataset metadata extracted from the native level.
    metadata: VolumeMetadata,
    /// Shared in-memory cache of decoded bricks.
    brick_cache: Arc<RwLock<BrickCache>>,
    /// On-disk brick cache, present for `cached=arco` datasets.
    disk_cache: Option<DiskBrickCache>,
}

impl<S: ReadableStorageTraits + Send + Sync + 'static> ZarrVolumeDataset<S> {
    /// Open a dataset from storage.
    ///
    /// # Arguments
    /// * `storage` - The storage backend
    /// * `prefix` - Dataset prefix within the store (root of the pyramid)
    /// * `dataset_id` - Stable identifier for cache keying
    /// * `cache_mode` - Whether to persist bricks to the disk cache
    /// * `config` - Store configuration
    pub fn open(
        storage: Arc<S>,
        prefix: &str,
        dataset_id: &str,
        cache_mode: CacheMode,
        config: &VolumeStoreConfig,
    ) -> Result<Self> {
        let native = Self::open_level(storage.clone(), prefix, 0)?;
        let metadata = Self::extract_metadata(&native, prefix)?;

        let mut levels = vec![native];
        for level in 1..metadata.levels {
            levels.push(Self::open_level(storage.clone(), prefix, level)?);
        }

        let mut level_shapes = Vec::with_capacity(levels.len());
        let mut level_chunk_shapes = Vec::with_capacity(levels.len());
        for (level, array) in levels.iter().enumerate() {
            level_shapes.push(Self::array_shape(array, level)?);
            level_chunk_shapes.push(Self::array_chunk_shape(array, level)?);
        }

        let disk_cache = match (cache_mode, &config.cache_dir) {
            (CacheMode::Arco, Some(dir)) => Some(DiskBrickCache::open(dir, dataset_id)?),
            _ => None,
        };

        let brick_cache = Arc::new(RwLock::new(BrickCache::new(
            config.brick_cache_size_bytes(),
        )));

        Ok(Self {
            levels,
            level_shapes,
            level_chunk_shapes,
            dataset_hash: hash_dataset_id(dataset_id),
            metadata,
            brick_cache,
            disk_cache,
        })
    }

    fn open_level(storage: Arc<S>, prefix: &str, level: u32) -> Result<Array<S>> {
        let path = format!("/{}/level_{}", prefix.trim_matches('/'), level);
        Array::open(storage, &path).map_err(|e| {
            VolumeStoreError::open_failed(format!("{path}: {e}"))
        })
    }

    /// Extract dataset metadata from the native-level array.
    fn extract_metadata(array: &Array<S>, prefix: &str) -> Result<VolumeMetadata> {
        let shape = Self::array_shape(array, 0)?;
        let chunk_shape = Self::array_chunk_shape(array, 0)?;

        let attrs = array.attributes();

        let name = attrs
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(prefix)
            .to_string();

        let units = attrs
            .get("units")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let levels = attrs
            .get("levels")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32;

        if levels == 0 {
            return Err(VolumeStoreError::invalid_metadata(
                "levels attribute must be at least 1",
            ));
        }

        let fill_value = array
            .fill_value()
            .as_ne_bytes()
            .try_into()
            .map(f32::from_ne_bytes)
            .unwrap_or(f32::NAN);

        Ok(VolumeMetadata {
            name,
            units,
            shape,
            chunk_shape,
            levels,
            fill_value,
        })
    }

    fn array_shape(array: &Array<S>, level: usize) -> Result<[u64; 4]> {
        array.shape().try_into().map_err(|_| {
            VolumeStoreError::invalid_metadata(format!(
                "level {level} must have 4 dimensions [time, depth, y, x], found {}",
                array.shape().len()
            ))
        })
    }

    fn array_chunk_shape(array: &Array<S>, level: usize) -> Result<[u64; 4]> {
        let origin = vec![0u64; array.shape().len()];
        let chunk_shape = array
            .chunk_grid()
            .chunk_shape(&origin, array.shape())
            .map_err(|e| VolumeStoreError::invalid_metadata(e.to_string()))?
            .ok_or_else(|| {
                VolumeStoreError::invalid_metadata(format!("level {level} missing chunk shape"))
            })?;

        let dims: Vec<u64> = chunk_shape.iter().map(|d| d.get()).collect();
        dims.try_into().map_err(|_| {
            VolumeStoreError::invalid_metadata(format!("level {level} chunk grid is not 4D"))
        })
    }

    /// Fetch one brick from the remote store (clipped at array edges).
    fn fetch_brick(&self, level: u32, coords: [u64; 4]) -> Result<Vec<f32>> {
        let chunk_shape = self.level_chunk_shapes[level as usize];
        let extent = self.level_shapes[level as usize];

        let origin = brick_origin(coords, chunk_shape);
        let shape = brick_extent(coords, chunk_shape, extent);

        let subset = ArraySubset::new_with_start_shape(origin.to_vec(), shape.to_vec())
            .map_err(|e| VolumeStoreError::read_failed(e.to_string()))?;

        self.levels[level as usize]
            .retrieve_array_subset_elements::<f32>(&subset)
            .map_err(|e| VolumeStoreError::read_failed(e.to_string()))
    }

    /// Read one brick through the cache hierarchy.
    async fn read_brick(&self, level: u32, coords: [u64; 4]) -> Result<Vec<f32>> {
        let key = (self.dataset_hash, level, coords);

        // Memory cache first
        {
            let mut cache = self.brick_cache.write().await;
            if let Some(data) = cache.get(&key) {
                return Ok(data.clone());
            }
        }

        // Then the on-disk cache
        if let Some(disk) = &self.disk_cache {
            if let Some(data) = disk.get(level, coords) {
                let mut cache = self.brick_cache.write().await;
                cache.insert(key, data.clone());
                return Ok(data);
            }
        }

        // Miss on both - fetch from the remote store (blocks in place via
        // the async-to-sync storage adapter)
        let data = self.fetch_brick(level, coords)?;

        if let Some(disk) = &self.disk_cache {
            disk.put(level, coords, &data);
        }

        {
            let mut cache = self.brick_cache.write().await;
            cache.insert(key, data.clone());
        }

        Ok(data)
    }
}

impl ZarrVolumeDataset<RemoteStorage> {
    /// Open a dataset from a production dataset URL.
    pub fn open_url(raw: &str, config: &VolumeStoreConfig) -> Result<Self> {
        let url = DatasetUrl::parse(raw)?;
        let storage = create_remote_storage(&url, config)?;
        Self::open(storage, &url.prefix, &url.cache_id(), url.cache_mode, config)
    }
}

#[async_trait]
impl<S: ReadableStorageTraits + Send + Sync + 'static> VolumeReader for ZarrVolumeDataset<S> {
    async fn read(&self, query: &VolumeQuery) -> Result<SubVolume> {
        let level = self.metadata.clamp_level(query.quality);
        let scale = self.metadata.level_scale(level);
        let extent = self.level_shapes[level as usize];

        if query.time >= extent[0] {
            return Err(VolumeStoreError::out_of_bounds(
                format!("time {}", query.time),
                format!("0..{}", extent[0]),
            ));
        }

        // Depth is never rescaled; the horizontal selections arrive in
        // native coordinates and shrink onto the level grid.
        let z = query.z.resolve(extent[1])?;
        let y = query.y.scaled(scale).resolve(extent[2])?;
        let x = query.x.scaled(scale).resolve(extent[3])?;

        let start = [query.time, z.start, y.start, x.start];
        let shape = [1, z.len(), y.len(), x.len()];

        let chunk_shape = self.level_chunk_shapes[level as usize];
        let bricks = bricks_for_subset(start, shape, chunk_shape);

        tracing::debug!(
            dataset = %self.metadata.name,
            level,
            start = ?start,
            shape = ?shape,
            bricks = bricks.len(),
            "reading sub-volume"
        );

        let num_values = (shape[1] * shape[2] * shape[3]) as usize;
        let mut output = vec![self.metadata.fill_value; num_values];

        for coords in bricks {
            let data = self.read_brick(level, coords).await?;
            let origin = brick_origin(coords, chunk_shape);
            let brick_shape = brick_extent(coords, chunk_shape, extent);
            copy_brick(&mut output, start, shape, &data, origin, brick_shape);
        }

        Ok(SubVolume::new([shape[1], shape[2], shape[3]], output))
    }

    fn metadata(&self) -> &VolumeMetadata {
        &self.metadata
    }

    fn cache_stats(&self) -> CacheStats {
        // Skip the stats rather than block a sync caller on the lock.
        self.brick_cache
            .try_read()
            .map(|cache| cache.stats())
            .unwrap_or_default()
    }
}

/// First index covered by a brick, in level coordinates.
fn brick_origin(coords: [u64; 4], chunk_shape: [u64; 4]) -> [u64; 4] {
    [
        coords[0] * chunk_shape[0],
        coords[1] * chunk_shape[1],
        coords[2] * chunk_shape[2],
        coords[3] * chunk_shape[3],
    ]
}

/// Extent of a brick, clipped at the level's edges.
fn brick_extent(coords: [u64; 4], chunk_shape: [u64; 4], level_extent: [u64; 4]) -> [u64; 4] {
    let origin = brick_origin(coords, chunk_shape);
    [
        chunk_shape[0].min(level_extent[0] - origin[0]),
        chunk_shape[1].min(level_extent[1] - origin[1]),
        chunk_shape[2].min(level_extent[2] - origin[2]),
        chunk_shape[3].min(level_extent[3] - origin[3]),
    ]
}

/// Calculate which bricks intersect a subset.
///
/// Pure arithmetic over the brick grid; the subset must already be clamped
/// to the level extent.
fn bricks_for_subset(start: [u64; 4], shape: [u64; 4], chunk_shape: [u64; 4]) -> Vec<[u64; 4]> {
    let mut first = [0u64; 4];
    let mut last = [0u64; 4];
    for dim in 0..4 {
        if shape[dim] == 0 {
            return Vec::new();
        }
        first[dim] = start[dim] / chunk_shape[dim];
        last[dim] = (start[dim] + shape[dim] - 1) / chunk_shape[dim];
    }

    let mut bricks = Vec::new();
    for t in first[0]..=last[0] {
        for z in first[1]..=last[1] {
            for y in first[2]..=last[2] {
                for x in first[3]..=last[3] {
                    bricks.push([t, z, y, x]);
                }
            }
        }
    }
    bricks
}

/// Copy the overlap between one brick and the requested subset into the
/// output buffer.
///
/// The output buffer is row-major over `subset_shape`; brick data is
/// row-major over `brick_shape` starting at `brick_start`.
fn copy_brick(
    output: &mut [f32],
    subset_start: [u64; 4],
    subset_shape: [u64; 4],
    brick: &[f32],
    brick_start: [u64; 4],
    brick_shape: [u64; 4],
) {
    let mut lo = [0u64; 4];
    let mut hi = [0u64; 4];
    for dim in 0..4 {
        lo[dim] = subset_start[dim].max(brick_start[dim]);
        hi[dim] = (subset_start[dim] + subset_shape[dim]).min(brick_start[dim] + brick_shape[dim]);
        if lo[dim] >= hi[dim] {
            return;
        }
    }

    let run = (hi[3] - lo[3]) as usize;
    for t in lo[0]..hi[0] {
        for z in lo[1]..hi[1] {
            for y in lo[2]..hi[2] {
                let brick_idx = (((t - brick_start[0]) * brick_shape[1] + (z - brick_start[1]))
                    * brick_shape[2]
                    + (y - brick_start[2]))
                    * brick_shape[3]
                    + (lo[3] - brick_start[3]);
                let out_idx = (((t - subset_start[0]) * subset_shape[1] + (z - subset_start[1]))
                    * subset_shape[2]
                    + (y - subset_start[2]))
                    * subset_shape[3]
                    + (lo[3] - subset_start[3]);

                let brick_idx = brick_idx as usize;
                let out_idx = out_idx as usize;
                output[out_idx..out_idx + run].copy_from_slice(&brick[brick_idx..brick_idx + run]);
            }
        }
    }
}
