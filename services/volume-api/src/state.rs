//! Application state for the volume API.

use anyhow::{Context, Result};
use std::sync::Arc;

use volume_store::{VolumeReader, ZarrVolumeDataset};

use crate::config::ServerConfig;

/// Shared application state: the three pre-opened dataset handles.
///
/// Built once at startup and injected into handlers; the handles are
/// read-only for the process lifetime.
pub struct AppState {
    /// Eastward velocity component.
    pub u: Arc<dyn VolumeReader>,
    /// Vertical velocity component.
    pub w: Arc<dyn VolumeReader>,
    /// Northward velocity component.
    pub v: Arc<dyn VolumeReader>,
}

impl AppState {
    /// Create a new AppState from environment configuration.
    pub async fn new() -> Result<Self> {
        Self::from_config(&ServerConfig::from_env())
    }

    /// Open the three datasets named by a configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let store_config = config.store_config();

        let u = ZarrVolumeDataset::open_url(&config.u_url, &store_config)
            .context("failed to open u dataset")?;
        let w = ZarrVolumeDataset::open_url(&config.w_url, &store_config)
            .context("failed to open w dataset")?;
        let v = ZarrVolumeDataset::open_url(&config.v_url, &store_config)
            .context("failed to open v dataset")?;

        tracing::info!(
            u = %u.metadata().name,
            w = %w.metadata().name,
            v = %v.metadata().name,
            shape = ?u.metadata().shape,
            levels = u.metadata().levels,
            "opened velocity datasets"
        );

        Ok(Self::with_readers(Arc::new(u), Arc::new(w), Arc::new(v)))
    }

    /// Build state from already-opened handles.
    pub fn with_readers(
        u: Arc<dyn VolumeReader>,
        w: Arc<dyn VolumeReader>,
        v: Arc<dyn VolumeReader>,
    ) -> Self {
        Self { u, w, v }
    }
}
