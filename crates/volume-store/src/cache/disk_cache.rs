//! On-disk brick cache.
//!
//! Datasets opened with `cached=arco` persist every fetched brick to the
//! local filesystem, so repeated reads (and restarts) skip the remote
//! store. Bricks are stored as raw f32 files under
//! `<cache_dir>/<dataset_hash>/level_<n>/t<t>.z<z>.y<y>.x<x>.brick`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::hash_dataset_id;
use crate::error::Result;

/// Filesystem-backed brick cache for one dataset.
pub struct DiskBrickCache {
    root: PathBuf,
}

impl DiskBrickCache {
    /// Open (creating if needed) the cache directory for a dataset.
    pub fn open(cache_dir: &Path, dataset_id: &str) -> Result<Self> {
        let root = cache_dir.join(format!("{:016x}", hash_dataset_id(dataset_id)));
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn brick_path(&self, level: u32, coords: [u64; 4]) -> PathBuf {
        self.root.join(format!(
            "level_{level}/t{}.z{}.y{}.x{}.brick",
            coords[0], coords[1], coords[2], coords[3]
        ))
    }

    /// Read a brick back from disk.
    ///
    /// Any unreadable or truncated file counts as a miss; a corrupt file is
    /// removed so the next fetch can rewrite it.
    pub fn get(&self, level: u32, coords: [u64; 4]) -> Option<Vec<f32>> {
        let path = self.brick_path(level, coords);
        let bytes = fs::read(&path).ok()?;

        if bytes.len() % std::mem::size_of::<f32>() != 0 {
            tracing::warn!(path = %path.display(), len = bytes.len(), "removing corrupt cached brick");
            let _ = fs::remove_file(&path);
            return None;
        }

        Some(bytemuck::pod_collect_to_vec::<u8, f32>(&bytes))
    }

    /// Persist a brick to disk.
    ///
    /// Written to a temporary file and renamed into place so concurrent
    /// readers never observe a partial brick. Failures degrade to a warning.
    pub fn put(&self, level: u32, coords: [u64; 4], data: &[f32]) {
        let path = self.brick_path(level, coords);
        let Some(parent) = path.parent() else {
            return;
        };

        let result = fs::create_dir_all(parent).and_then(|()| {
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, bytemuck::cast_slice::<f32, u8>(data))?;
            fs::rename(&tmp, &path)
        });

        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist brick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_then_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let cache = DiskBrickCache::open(dir.path(), "llc2160_u").unwrap();

        let data = vec![0.5f32, -1.25, 3.0];
        cache.put(2, [0, 1, 2, 3], &data);
        assert_eq!(cache.get(2, [0, 1, 2, 3]), Some(data));
    }

    #[test]
    fn test_miss_on_absent_brick() {
        let dir = TempDir::new().unwrap();
        let cache = DiskBrickCache::open(dir.path(), "llc2160_u").unwrap();
        assert_eq!(cache.get(0, [0, 0, 0, 0]), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let data = vec![9.0f32; 8];
        {
            let cache = DiskBrickCache::open(dir.path(), "llc2160_v").unwrap();
            cache.put(0, [1, 0, 0, 0], &data);
        }
        let cache = DiskBrickCache::open(dir.path(), "llc2160_v").unwrap();
        assert_eq!(cache.get(0, [1, 0, 0, 0]), Some(data));
    }

    #[test]
    fn test_datasets_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let u = DiskBrickCache::open(dir.path(), "llc2160_u").unwrap();
        let w = DiskBrickCache::open(dir.path(), "llc2160_w").unwrap();

        u.put(0, [0, 0, 0, 0], &[1.0]);
        assert_eq!(w.get(0, [0, 0, 0, 0]), None);
    }

    #[test]
    fn test_corrupt_brick_removed() {
        let dir = TempDir::new().unwrap();
        let cache = DiskBrickCache::open(dir.path(), "llc2160_u").unwrap();

        cache.put(0, [0, 0, 0, 0], &[1.0, 2.0]);
        let path = cache.brick_path(0, [0, 0, 0, 0]);
        fs::write(&path, [0u8; 5]).unwrap();

        assert_eq!(cache.get(0, [0, 0, 0, 0]), None);
        assert!(!path.exists());
    }
}
