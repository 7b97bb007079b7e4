//! Health and readiness handlers.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use volume_store::VolumeReader;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct DatasetStatus {
    pub name: String,
    pub shape: [u64; 4],
    pub levels: u32,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub datasets: Vec<DatasetStatus>,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /ready - Readiness check
///
/// The dataset handles are opened before the listener starts, so a serving
/// process is ready by construction; this reports what was opened.
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ReadyResponse> {
    let datasets = [&state.u, &state.w, &state.v]
        .into_iter()
        .map(|reader| {
            let meta = reader.metadata();
            DatasetStatus {
                name: meta.name.clone(),
                shape: meta.shape,
                levels: meta.levels,
            }
        })
        .collect();

    Json(ReadyResponse {
        ready: true,
        datasets,
    })
}
