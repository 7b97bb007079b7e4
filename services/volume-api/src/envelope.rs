//! Binary response envelope.
//!
//! The response is a msgpack map with string keys: the shared `shape`, the
//! fixed `dtype`, and one raw byte buffer per velocity component. Byte
//! buffers use the msgpack bin format so clients can reinterpret them as
//! float32 arrays without any UTF-8 handling.

use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

use volume_store::SubVolume;

use crate::error::ApiError;

/// Content type of the packed envelope.
pub const MSGPACK_CONTENT_TYPE: &str = "application/x-msgpack";

/// Element type of every component array, independent of backend dtype.
const DTYPE: &str = "float32";

/// The packed volume response.
#[derive(Debug, Serialize, Deserialize)]
pub struct VolumePayload {
    /// Common `[nz, ny, nx]` shape of the three arrays.
    pub shape: Vec<u32>,
    /// Always `"float32"`.
    pub dtype: String,
    /// Raw row-major little-endian f32 bytes of the u component.
    pub u_array: ByteBuf,
    /// Raw row-major little-endian f32 bytes of the w component.
    pub w_array: ByteBuf,
    /// Raw row-major little-endian f32 bytes of the v component.
    pub v_array: ByteBuf,
}

impl VolumePayload {
    /// Assemble the envelope from the three component reads.
    ///
    /// The three reads share one query, so their shapes must agree; the
    /// u-array's shape becomes the envelope's shared shape field.
    pub fn from_components(u: SubVolume, w: SubVolume, v: SubVolume) -> Result<Self, ApiError> {
        if w.shape != u.shape {
            return Err(ApiError::ShapeMismatch {
                dataset: "w",
                expected: u.shape,
                got: w.shape,
            });
        }
        if v.shape != u.shape {
            return Err(ApiError::ShapeMismatch {
                dataset: "v",
                expected: u.shape,
                got: v.shape,
            });
        }

        Ok(Self {
            shape: u.shape.iter().map(|&d| d as u32).collect(),
            dtype: DTYPE.to_string(),
            u_array: component_bytes(&u),
            w_array: component_bytes(&w),
            v_array: component_bytes(&v),
        })
    }

    /// Encode as a msgpack map with named keys.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, ApiError> {
        rmp_serde::to_vec_named(self).map_err(|e| ApiError::Encoding(e.to_string()))
    }
}

fn component_bytes(sub: &SubVolume) -> ByteBuf {
    ByteBuf::from(bytemuck::cast_slice::<f32, u8>(&sub.data).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(shape: [u64; 3], value: f32) -> SubVolume {
        let len = shape.iter().product::<u64>() as usize;
        SubVolume::new(shape, vec![value; len])
    }

    #[test]
    fn test_envelope_shape_follows_u() {
        let payload = VolumePayload::from_components(
            sub([2, 3, 4], 1.0),
            sub([2, 3, 4], 2.0),
            sub([2, 3, 4], 3.0),
        )
        .unwrap();

        assert_eq!(payload.shape, vec![2, 3, 4]);
        assert_eq!(payload.dtype, "float32");
    }

    #[test]
    fn test_byte_length_is_product_times_four() {
        let payload = VolumePayload::from_components(
            sub([2, 3, 4], 1.0),
            sub([2, 3, 4], 2.0),
            sub([2, 3, 4], 3.0),
        )
        .unwrap();

        let expected = 2 * 3 * 4 * 4;
        assert_eq!(payload.u_array.len(), expected);
        assert_eq!(payload.w_array.len(), expected);
        assert_eq!(payload.v_array.len(), expected);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = VolumePayload::from_components(
            sub([2, 3, 4], 1.0),
            sub([2, 3, 5], 2.0),
            sub([2, 3, 4], 3.0),
        )
        .unwrap_err();

        assert!(matches!(err, ApiError::ShapeMismatch { dataset: "w", .. }));
    }

    #[test]
    fn test_msgpack_uses_named_keys_and_bin_payloads() {
        let payload = VolumePayload::from_components(
            sub([1, 1, 2], 1.5),
            sub([1, 1, 2], 2.5),
            sub([1, 1, 2], 3.5),
        )
        .unwrap();

        let packed = payload.to_msgpack().unwrap();
        let decoded: VolumePayload = rmp_serde::from_slice(&packed).unwrap();

        assert_eq!(decoded.shape, vec![1, 1, 2]);
        assert_eq!(decoded.dtype, "float32");
        assert_eq!(decoded.u_array, payload.u_array);

        let values = bytemuck::pod_collect_to_vec::<u8, f32>(&decoded.v_array);
        assert_eq!(values, vec![3.5, 3.5]);
    }
}
