//! Typed volume queries.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolumeStoreError};

/// A half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: u64,
    pub end: u64,
}

impl IndexRange {
    /// Create a new range.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of indices covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range covers nothing.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Selection along one axis of a volume.
///
/// Mirrors the wire form of the query parameters: no values selects the
/// whole axis, one value a single index, two values a half-open range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSelection {
    /// The full axis extent.
    Full,
    /// A single index (width-1 range).
    Single(u64),
    /// A half-open range `[start, end)`.
    Range { start: u64, end: u64 },
}

impl AxisSelection {
    /// Build a selection from the repeated integer values of one query
    /// parameter.
    pub fn from_values(values: &[i64]) -> Result<Self> {
        for &v in values {
            if v < 0 {
                return Err(VolumeStoreError::invalid_query(format!(
                    "negative index {v}"
                )));
            }
        }
        match values {
            [] => Ok(Self::Full),
            [single] => Ok(Self::Single(*single as u64)),
            [start, end] => {
                if start >= end {
                    return Err(VolumeStoreError::invalid_query(format!(
                        "range start {start} is not below end {end}"
                    )));
                }
                Ok(Self::Range {
                    start: *start as u64,
                    end: *end as u64,
                })
            }
            more => Err(VolumeStoreError::invalid_query(format!(
                "expected at most 2 values, got {}",
                more.len()
            ))),
        }
    }

    /// Rescale a native-coordinate selection onto a coarser pyramid level.
    ///
    /// Division keeps at least one sample so a narrow native range never
    /// collapses to nothing at depth.
    pub fn scaled(&self, scale: u64) -> Self {
        match *self {
            Self::Full => Self::Full,
            Self::Single(i) => Self::Single(i / scale),
            Self::Range { start, end } => {
                let start = start / scale;
                let end = end.div_ceil(scale).max(start + 1);
                Self::Range { start, end }
            }
        }
    }

    /// Resolve the selection against an axis extent, clamping ranges.
    ///
    /// A selection that lies entirely outside the extent is an error.
    pub fn resolve(&self, extent: u64) -> Result<IndexRange> {
        match *self {
            Self::Full => Ok(IndexRange::new(0, extent)),
            Self::Single(i) => {
                if i >= extent {
                    return Err(VolumeStoreError::out_of_bounds(
                        format!("index {i}"),
                        format!("0..{extent}"),
                    ));
                }
                Ok(IndexRange::new(i, i + 1))
            }
            Self::Range { start, end } => {
                if start >= extent {
                    return Err(VolumeStoreError::out_of_bounds(
                        format!("range {start}..{end}"),
                        format!("0..{extent}"),
                    ));
                }
                Ok(IndexRange::new(start, end.min(extent)))
            }
        }
    }
}

/// A resolved read request against one volume dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeQuery {
    /// Time-step index.
    pub time: u64,
    /// Depth selection (never rescaled between levels).
    pub z: AxisSelection,
    /// Horizontal y selection in native coordinates.
    pub y: AxisSelection,
    /// Horizontal x selection in native coordinates.
    pub x: AxisSelection,
    /// Detail level; magnitude selects the pyramid level.
    pub quality: u32,
}

impl Default for VolumeQuery {
    fn default() -> Self {
        Self {
            time: 0,
            z: AxisSelection::Full,
            y: AxisSelection::Full,
            x: AxisSelection::Full,
            quality: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_empty_is_full() {
        assert_eq!(AxisSelection::from_values(&[]).unwrap(), AxisSelection::Full);
    }

    #[test]
    fn test_from_values_single() {
        assert_eq!(
            AxisSelection::from_values(&[7]).unwrap(),
            AxisSelection::Single(7)
        );
    }

    #[test]
    fn test_from_values_range() {
        assert_eq!(
            AxisSelection::from_values(&[0, 100]).unwrap(),
            AxisSelection::Range { start: 0, end: 100 }
        );
    }

    #[test]
    fn test_from_values_rejects_inverted_range() {
        assert!(AxisSelection::from_values(&[10, 10]).is_err());
        assert!(AxisSelection::from_values(&[10, 3]).is_err());
    }

    #[test]
    fn test_from_values_rejects_negative_and_extra() {
        assert!(AxisSelection::from_values(&[-1]).is_err());
        assert!(AxisSelection::from_values(&[0, 10, 20]).is_err());
    }

    #[test]
    fn test_resolve_full() {
        let range = AxisSelection::Full.resolve(90).unwrap();
        assert_eq!(range, IndexRange::new(0, 90));
    }

    #[test]
    fn test_resolve_single_in_and_out_of_extent() {
        assert_eq!(
            AxisSelection::Single(89).resolve(90).unwrap(),
            IndexRange::new(89, 90)
        );
        assert!(AxisSelection::Single(90).resolve(90).is_err());
    }

    #[test]
    fn test_resolve_clamps_range_end() {
        let range = AxisSelection::Range { start: 80, end: 200 }
            .resolve(90)
            .unwrap();
        assert_eq!(range, IndexRange::new(80, 90));
    }

    #[test]
    fn test_resolve_rejects_range_past_extent() {
        assert!(AxisSelection::Range { start: 90, end: 100 }.resolve(90).is_err());
    }

    #[test]
    fn test_scaled_range_rounds_outward() {
        let sel = AxisSelection::Range { start: 0, end: 100 };
        assert_eq!(sel.scaled(4), AxisSelection::Range { start: 0, end: 25 });

        let narrow = AxisSelection::Range { start: 10, end: 11 };
        assert_eq!(narrow.scaled(8), AxisSelection::Range { start: 1, end: 2 });
    }

    #[test]
    fn test_scaled_single() {
        assert_eq!(AxisSelection::Single(100).scaled(4), AxisSelection::Single(25));
    }
}
