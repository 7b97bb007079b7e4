//! Core types for volume access.

use serde::{Deserialize, Serialize};

/// Metadata about a volume dataset.
///
/// Axis order is `[time, depth, y, x]` throughout. Horizontal extents halve
/// at each pyramid level; depth and time are never downsampled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeMetadata {
    /// Dataset name (e.g. "llc2160_u").
    pub name: String,
    /// Physical units (e.g. "m/s").
    pub units: String,
    /// Native extents `[time, depth, y, x]`.
    pub shape: [u64; 4],
    /// Brick extents `[time, depth, y, x]`.
    pub chunk_shape: [u64; 4],
    /// Number of pyramid levels, including the native level 0.
    pub levels: u32,
    /// Fill/missing value.
    pub fill_value: f32,
}

impl VolumeMetadata {
    /// Extents `[time, depth, y, x]` at a pyramid level.
    ///
    /// Horizontal extents shrink by `2^level` with a floor of one sample.
    pub fn level_extent(&self, level: u32) -> [u64; 4] {
        let scale = 1u64 << level;
        [
            self.shape[0],
            self.shape[1],
            (self.shape[2] / scale).max(1),
            (self.shape[3] / scale).max(1),
        ]
    }

    /// Horizontal scale factor at a pyramid level.
    pub fn level_scale(&self, level: u32) -> u64 {
        1u64 << level
    }

    /// Clamp a requested quality to an available pyramid level.
    pub fn clamp_level(&self, quality: u32) -> u32 {
        quality.min(self.levels.saturating_sub(1))
    }
}

/// A contiguous sub-volume read from a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SubVolume {
    /// Extents `[depth, y, x]` of the data.
    pub shape: [u64; 3],
    /// Sample values in row-major order (x fastest).
    pub data: Vec<f32>,
}

impl SubVolume {
    /// Create a new sub-volume, verifying the buffer matches the shape.
    pub fn new(shape: [u64; 3], data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<u64>() as usize, data.len());
        Self { shape, data }
    }

    /// Total number of samples.
    pub fn num_values(&self) -> usize {
        self.data.len()
    }

    /// Check if the sub-volume holds no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Statistics about the brick cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub memory_bytes: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
