//! Brick caching: in-memory LRU and on-disk persistence.

mod brick_cache;
mod disk_cache;

pub use brick_cache::{hash_dataset_id, BrickCache, BrickKey};
pub use disk_cache::DiskBrickCache;
