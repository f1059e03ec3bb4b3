use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Number of hand keypoints reported by the detector.
pub const NUM_LANDMARKS: usize = 21;
/// Coordinates per keypoint (x, y, z).
pub const AXES: usize = 3;
/// Flattened feature width (21 points * 3 axes).
pub const FEATURE_DIM: usize = NUM_LANDMARKS * AXES;

/// Index of the wrist keypoint, used as the origin during normalization.
pub const WRIST: usize = 0;

/// One detected hand: exactly 21 ordered `[x, y, z]` points in the detector's
/// normalized image space. "No detection" is modelled as `Option::None` by callers,
/// never as an all-zero set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: [[f32; AXES]; NUM_LANDMARKS],
}

impl LandmarkSet {
    pub fn new(points: [[f32; AXES]; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Build from a point list; fails unless there are exactly 21 points.
    pub fn from_points(points: &[[f32; AXES]]) -> Result<Self, ContractError> {
        let points: [[f32; AXES]; NUM_LANDMARKS] =
            points
                .try_into()
                .map_err(|_| ContractError::LandmarkCount {
                    expected: NUM_LANDMARKS,
                    actual: points.len(),
                })?;
        Ok(Self { points })
    }

    /// Build from a flattened `x0,y0,z0,x1,...` slice of 63 values.
    pub fn from_flat(values: &[f32]) -> Result<Self, ContractError> {
        if values.len() != FEATURE_DIM {
            return Err(ContractError::FeatureWidth {
                expected: FEATURE_DIM,
                actual: values.len(),
            });
        }
        let mut points = [[0.0f32; AXES]; NUM_LANDMARKS];
        for (point, chunk) in points.iter_mut().zip(values.chunks_exact(AXES)) {
            point.copy_from_slice(chunk);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[[f32; AXES]; NUM_LANDMARKS] {
        &self.points
    }

    pub fn wrist(&self) -> [f32; AXES] {
        self.points[WRIST]
    }

    pub fn is_finite(&self) -> bool {
        self.points.iter().flatten().all(|v| v.is_finite())
    }

    /// Flatten in point-major, axis-minor order.
    pub fn to_flat(&self) -> [f32; FEATURE_DIM] {
        let mut out = [0.0f32; FEATURE_DIM];
        for (chunk, point) in out.chunks_exact_mut(AXES).zip(self.points.iter()) {
            chunk.copy_from_slice(point);
        }
        out
    }
}

/// Fixed-width model input produced from a present [`LandmarkSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_DIM]);

impl FeatureVector {
    pub fn new(values: [f32; FEATURE_DIM]) -> Self {
        Self(values)
    }

    pub fn from_slice(values: &[f32]) -> Result<Self, ContractError> {
        let values: [f32; FEATURE_DIM] =
            values
                .try_into()
                .map_err(|_| ContractError::FeatureWidth {
                    expected: FEATURE_DIM,
                    actual: values.len(),
                })?;
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn values(&self) -> &[f32; FEATURE_DIM] {
        &self.0
    }
}

/// Column names of the feature part of the table: `x0,y0,z0,...,x20,y20,z20`.
pub fn feature_columns() -> Vec<String> {
    (0..NUM_LANDMARKS)
        .flat_map(|i| ["x", "y", "z"].into_iter().map(move |axis| format!("{axis}{i}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_point_count() {
        let err = LandmarkSet::from_points(&[[0.0; 3]; 20]).unwrap_err();
        assert!(matches!(
            err,
            ContractError::LandmarkCount {
                expected: 21,
                actual: 20
            }
        ));
    }

    #[test]
    fn flat_order_is_point_major() {
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        points[1] = [1.0, 2.0, 3.0];
        let flat = LandmarkSet::new(points).to_flat();
        assert_eq!(&flat[3..6], &[1.0, 2.0, 3.0]);
        let back = LandmarkSet::from_flat(&flat).unwrap();
        assert_eq!(back.points()[1], [1.0, 2.0, 3.0]);
    }

    #[test]
    fn feature_columns_match_flat_layout() {
        let cols = feature_columns();
        assert_eq!(cols.len(), FEATURE_DIM);
        assert_eq!(&cols[..4], &["x0", "y0", "z0", "x1"]);
        assert_eq!(cols.last().map(String::as_str), Some("z20"));
    }
}
