//! Typed query-parameter parsing.
//!
//! The wire format follows the deployed clients: `quality` and `time` are
//! single integers, while `z`, `x_range` and `y_range` are repeated keys
//! (`?z=0&z=10`). Axum's `Query` extractor hands us the raw pairs; this
//! module turns them into a typed request, failing with a field-specific
//! error for anything malformed.

use volume_store::{AxisSelection, VolumeQuery};

use crate::error::ApiError;

/// Parsed and validated query parameters for a volume request.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeParams {
    pub quality: i32,
    pub time: u64,
    pub z: AxisSelection,
    pub y: AxisSelection,
    pub x: AxisSelection,
}

impl VolumeParams {
    /// Build parameters from raw query pairs.
    ///
    /// Unknown keys are ignored; for the scalar parameters the first
    /// occurrence wins.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let quality = parse_scalar(pairs, "quality")?.unwrap_or(0) as i32;

        let time = match parse_scalar(pairs, "time")?.unwrap_or(0) {
            t if t < 0 => {
                return Err(ApiError::invalid_parameter(
                    "time",
                    t.to_string(),
                    "negative time-step index",
                ))
            }
            t => t as u64,
        };

        let z = parse_axis(pairs, "z")?;
        let x = parse_axis(pairs, "x_range")?;
        let y = parse_axis(pairs, "y_range")?;

        Ok(Self {
            quality,
            time,
            z,
            y,
            x,
        })
    }

    /// Convert to the store's query type.
    ///
    /// Quality magnitude selects the pyramid level, so the OpenVisus-style
    /// negative quality values degrade identically to positive ones.
    pub fn to_query(&self) -> VolumeQuery {
        VolumeQuery {
            time: self.time,
            z: self.z,
            y: self.y,
            x: self.x,
            quality: self.quality.unsigned_abs(),
        }
    }
}

/// Parse the first occurrence of a scalar integer parameter.
fn parse_scalar(pairs: &[(String, String)], field: &'static str) -> Result<Option<i64>, ApiError> {
    let Some((_, value)) = pairs.iter().find(|(key, _)| key == field) else {
        return Ok(None);
    };

    value
        .parse::<i64>()
        .map(Some)
        .map_err(|e| ApiError::invalid_parameter(field, value, e.to_string()))
}

/// Parse every occurrence of a repeated integer parameter into an axis
/// selection.
fn parse_axis(pairs: &[(String, String)], field: &'static str) -> Result<AxisSelection, ApiError> {
    let mut values = Vec::new();
    for (_, value) in pairs.iter().filter(|(key, _)| key == field) {
        let parsed = value
            .parse::<i64>()
            .map_err(|e| ApiError::invalid_parameter(field, value, e.to_string()))?;
        values.push(parsed);
    }

    AxisSelection::from_values(&values).map_err(|e| {
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        ApiError::invalid_parameter(field, joined, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_absent() {
        let params = VolumeParams::from_pairs(&[]).unwrap();
        assert_eq!(params.quality, 0);
        assert_eq!(params.time, 0);
        assert_eq!(params.z, AxisSelection::Full);
        assert_eq!(params.x, AxisSelection::Full);
        assert_eq!(params.y, AxisSelection::Full);
    }

    #[test]
    fn test_full_request() {
        let params = VolumeParams::from_pairs(&pairs(&[
            ("quality", "0"),
            ("time", "42"),
            ("z", "0"),
            ("z", "10"),
            ("x_range", "0"),
            ("x_range", "100"),
            ("y_range", "0"),
            ("y_range", "100"),
        ]))
        .unwrap();

        assert_eq!(params.time, 42);
        assert_eq!(params.z, AxisSelection::Range { start: 0, end: 10 });
        assert_eq!(params.x, AxisSelection::Range { start: 0, end: 100 });
        assert_eq!(params.y, AxisSelection::Range { start: 0, end: 100 });
    }

    #[test]
    fn test_single_value_axis() {
        let params = VolumeParams::from_pairs(&pairs(&[("z", "5")])).unwrap();
        assert_eq!(params.z, AxisSelection::Single(5));
    }

    #[test]
    fn test_malformed_quality_names_the_field() {
        let err = VolumeParams::from_pairs(&pairs(&[("quality", "abc")])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParameter { field: "quality", .. }
        ));
        assert!(err.to_string().contains("quality=abc"));
    }

    #[test]
    fn test_malformed_axis_value_names_the_field() {
        let err =
            VolumeParams::from_pairs(&pairs(&[("x_range", "0"), ("x_range", "wide")])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParameter { field: "x_range", .. }
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err =
            VolumeParams::from_pairs(&pairs(&[("y_range", "100"), ("y_range", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParameter { field: "y_range", .. }
        ));
    }

    #[test]
    fn test_negative_time_rejected() {
        let err = VolumeParams::from_pairs(&pairs(&[("time", "-3")])).unwrap_err();
        assert!(matches!(err, ApiError::InvalidParameter { field: "time", .. }));
    }

    #[test]
    fn test_first_scalar_occurrence_wins() {
        let params =
            VolumeParams::from_pairs(&pairs(&[("time", "7"), ("time", "9")])).unwrap();
        assert_eq!(params.time, 7);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = VolumeParams::from_pairs(&pairs(&[("foo", "bar")])).unwrap();
        assert_eq!(params, VolumeParams::from_pairs(&[]).unwrap());
    }

    #[test]
    fn test_negative_quality_maps_to_level_magnitude() {
        let params = VolumeParams::from_pairs(&pairs(&[("quality", "-2")])).unwrap();
        assert_eq!(params.to_query().quality, 2);
    }
}
