//! Volume read handler.
//!
//! The single data route of the service: parse the query, read the three
//! velocity components with one identical query, and return the packed
//! envelope.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, Query},
    http::header,
    response::Response,
};

use volume_store::VolumeReader;

use crate::envelope::{VolumePayload, MSGPACK_CONTENT_TYPE};
use crate::error::ApiError;
use crate::params::VolumeParams;
use crate::state::AppState;

/// GET /
pub async fn volume_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let params = VolumeParams::from_pairs(&pairs)?;

    tracing::info!(
        quality = params.quality,
        time = params.time,
        z = ?params.z,
        x_range = ?params.x,
        y_range = ?params.y,
        "volume request"
    );

    // The three components are read sequentially with the same query; a
    // failure in any of them fails the whole request.
    let query = params.to_query();
    let u = state.u.read(&query).await?;
    let w = state.w.read(&query).await?;
    let v = state.v.read(&query).await?;

    let packed = VolumePayload::from_components(u, w, v)?.to_msgpack()?;

    Response::builder()
        .header(header::CONTENT_TYPE, MSGPACK_CONTENT_TYPE)
        .body(Body::from(packed))
        .map_err(|e| ApiError::Encoding(e.to_string()))
}
