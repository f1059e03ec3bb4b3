//! Wrist-relative landmark normalization.
//!
//! Every point (wrist included) is translated so the wrist becomes the origin, then the
//! set is flattened point-major. Scale and rotation are left untouched.

use data_contracts::{ContractError, FeatureVector, LandmarkSet, AXES, FEATURE_DIM};

pub fn normalize(landmarks: &LandmarkSet) -> FeatureVector {
    let wrist = landmarks.wrist();
    let mut out = [0.0f32; FEATURE_DIM];
    for (chunk, point) in out.chunks_exact_mut(AXES).zip(landmarks.points().iter()) {
        for axis in 0..AXES {
            chunk[axis] = point[axis] - wrist[axis];
        }
    }
    FeatureVector::new(out)
}

/// Normalize an already-flattened 63-value vector (raw detector output).
pub fn normalize_flat(values: &[f32]) -> Result<FeatureVector, ContractError> {
    let landmarks = LandmarkSet::from_flat(values)?;
    Ok(normalize(&landmarks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_contracts::NUM_LANDMARKS;

    fn hand(offset: f32) -> LandmarkSet {
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        for (i, p) in points.iter_mut().enumerate() {
            let t = i as f32 * 0.01;
            *p = [offset + 0.4 + t, offset + 0.6 - t, -0.02 * t];
        }
        LandmarkSet::new(points)
    }

    #[test]
    fn wrist_becomes_origin() {
        let f = normalize(&hand(0.1));
        assert_eq!(&f.as_slice()[0..3], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn translation_invariant() {
        let a = normalize(&hand(0.0));
        let b = normalize(&hand(0.25));
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn idempotent() {
        let once = normalize(&hand(0.3));
        let twice = normalize_flat(once.as_slice()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn no_scaling_applied() {
        let mut points = [[0.0f32; 3]; NUM_LANDMARKS];
        points[0] = [0.5, 0.5, 0.0];
        points[9] = [0.5, 0.1, 0.2];
        let f = normalize(&LandmarkSet::new(points));
        let expected = [0.0, -0.4, 0.2];
        for (got, want) in f.as_slice()[27..30].iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn flat_input_must_have_63_values() {
        assert!(normalize_flat(&[0.0; 62]).is_err());
    }
}
