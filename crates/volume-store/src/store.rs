//! Object-storage backend construction for volume datasets.
//!
//! Datasets live behind S3-compatible endpoints. This module turns a parsed
//! [`DatasetUrl`] into a storage backend the zarrs crate can read through.

use std::sync::Arc;

// Use the direct object_store crate (version must match what zarrs_object_store uses)
use object_store::aws::AmazonS3Builder;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};

use crate::config::VolumeStoreConfig;
use crate::error::{Result, VolumeStoreError};
use crate::url::DatasetUrl;

/// Blocking executor that works from within a tokio runtime.
///
/// Uses `tokio::task::block_in_place` to move the current task to a blocking
/// thread, then uses the runtime handle to drive the future. This avoids the
/// "cannot start a runtime from within a runtime" error.
#[derive(Clone, Copy)]
pub struct TokioBlockOn;

impl AsyncToSyncBlockOn for TokioBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        // block_in_place moves the current task off the async worker thread
        // so we can safely call block_on without nesting runtimes
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
    }
}

/// Storage type alias for remote volume access (async).
pub type AsyncRemoteStorage = AsyncObjectStore<object_store::aws::AmazonS3>;

/// Storage type alias for remote volume access (sync adapter).
/// This type implements ReadableStorageTraits and can be used with ZarrVolumeDataset.
pub type RemoteStorage = AsyncToSyncStorageAdapter<AsyncRemoteStorage, TokioBlockOn>;

/// Create a storage backend for a dataset URL.
///
/// Builds an object_store client for the URL's endpoint and credentials,
/// wraps it in AsyncObjectStore, and then wraps that in an async-to-sync
/// adapter for use with the synchronous zarrs API.
pub fn create_remote_storage(
    dataset: &DatasetUrl,
    config: &VolumeStoreConfig,
) -> Result<Arc<RemoteStorage>> {
    let s3 = AmazonS3Builder::new()
        .with_endpoint(&dataset.endpoint)
        .with_bucket_name(&dataset.bucket)
        .with_access_key_id(&dataset.access_key_id)
        .with_secret_access_key(&dataset.secret_access_key)
        .with_region(&config.region)
        .with_allow_http(config.allow_http)
        .build()
        .map_err(|e| {
            VolumeStoreError::open_failed(format!("failed to create storage client: {e}"))
        })?;

    let async_store = Arc::new(AsyncObjectStore::new(s3));

    let sync_store = AsyncToSyncStorageAdapter::new(async_store, TokioBlockOn);

    Ok(Arc::new(sync_store))
}
