//! Gradient aggregation across local steps or clients.

use crate::core::{Error, Result};
use crate::gradient::set::GradientSet;
use crate::gradient::tensor::Tensor;

/// Element-wise arithmetic mean over a batch of gradient sets.
///
/// Every set must carry the same parameter names and shapes as the first;
/// the layout is validated upfront and mismatches fail with
/// [`Error::ShapeMismatch`] before any arithmetic runs. An empty batch fails
/// with [`Error::EmptyInput`].
pub fn aggregate(sets: &[GradientSet]) -> Result<GradientSet> {
    let weights = vec![1.0; sets.len()];
    aggregate_weighted(sets, &weights)
}

/// Weighted element-wise mean, with weights normalized to sum to one.
///
/// Weights must be non-negative and finite with a positive total. Equal
/// weights reduce to the plain arithmetic mean.
pub fn aggregate_weighted(sets: &[GradientSet], weights: &[f32]) -> Result<GradientSet> {
    let first = sets.first().ok_or_else(|| {
        Error::EmptyInput("cannot aggregate an empty batch of gradient sets".to_string())
    })?;

    if weights.len() != sets.len() {
        return Err(Error::InvalidParameter(format!(
            "got {} weights for {} gradient sets",
            weights.len(),
            sets.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidParameter(
            "weights must be non-negative and finite".to_string(),
        ));
    }
    let total_weight: f64 = weights.iter().map(|&w| w as f64).sum();
    if total_weight <= 0.0 {
        return Err(Error::InvalidParameter(
            "total weight must be positive".to_string(),
        ));
    }

    validate_layout(first, sets)?;

    let mut result = GradientSet::new();
    for (name, tensor) in first.iter() {
        let mut acc = vec![0.0f32; tensor.element_count()];
        for (set, &weight) in sets.iter().zip(weights) {
            let contribution = (weight as f64 / total_weight) as f32;
            let other = set.get(name).ok_or_else(|| {
                Error::ShapeMismatch(format!("parameter '{}' missing from gradient set", name))
            })?;
            for (slot, &x) in acc.iter_mut().zip(other.data()) {
                *slot += contribution * x;
            }
        }
        result.insert(name, Tensor::new(tensor.shape().to_vec(), acc)?)?;
    }
    Ok(result)
}

/// Check that every set shares the first set's parameter names and shapes.
fn validate_layout(first: &GradientSet, sets: &[GradientSet]) -> Result<()> {
    for (i, set) in sets.iter().enumerate() {
        if set.len() != first.len() {
            return Err(Error::ShapeMismatch(format!(
                "gradient set {} has {} parameters, expected {}",
                i,
                set.len(),
                first.len()
            )));
        }
        for (name, tensor) in first.iter() {
            match set.get(name) {
                Some(other) if other.same_shape(tensor) => {}
                Some(other) => {
                    return Err(Error::ShapeMismatch(format!(
                        "parameter '{}' has shape {:?} in gradient set {}, expected {:?}",
                        name,
                        other.shape(),
                        i,
                        tensor.shape()
                    )));
                }
                None => {
                    return Err(Error::ShapeMismatch(format!(
                        "parameter '{}' missing from gradient set {}",
                        name, i
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_from(pairs: &[(&str, Vec<f32>)]) -> GradientSet {
        let mut set = GradientSet::new();
        for (name, data) in pairs {
            set.insert(name, Tensor::from_vec(data.clone()).unwrap())
                .unwrap();
        }
        set
    }

    #[test]
    fn test_aggregate_mean() {
        let a = set_from(&[("w", vec![1.0, 2.0, 3.0])]);
        let b = set_from(&[("w", vec![3.0, 4.0, 5.0])]);

        let mean = aggregate(&[a, b]).unwrap();
        assert_eq!(mean.get("w").unwrap().data(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let a = set_from(&[("w", vec![1.0, 2.0]), ("b", vec![0.5])]);
        let b = set_from(&[("w", vec![3.0, 6.0]), ("b", vec![1.5])]);

        let ab = aggregate(&[a.clone(), b.clone()]).unwrap();
        let ba = aggregate(&[b, a]).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_aggregate_single_set_is_identity() {
        let a = set_from(&[("w", vec![1.0, -2.0])]);
        let mean = aggregate(&[a.clone()]).unwrap();
        assert_eq!(mean, a);
    }

    #[test]
    fn test_aggregate_empty_batch_fails() {
        assert!(matches!(aggregate(&[]), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_aggregate_rejects_missing_parameter() {
        let a = set_from(&[("w", vec![1.0]), ("b", vec![2.0])]);
        let b = set_from(&[("w", vec![1.0]), ("bias", vec![2.0])]);
        assert!(matches!(
            aggregate(&[a, b]),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_aggregate_rejects_shape_mismatch() {
        let a = set_from(&[("w", vec![1.0, 2.0])]);
        let b = set_from(&[("w", vec![1.0, 2.0, 3.0])]);
        assert!(matches!(
            aggregate(&[a, b]),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_weighted_aggregate() {
        let a = set_from(&[("w", vec![1.0])]);
        let b = set_from(&[("w", vec![3.0])]);

        // (1.0 * 1/4) + (3.0 * 3/4) = 2.5
        let mean = aggregate_weighted(&[a, b], &[1.0, 3.0]).unwrap();
        assert!((mean.get("w").unwrap().data()[0] - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_aggregate_rejects_zero_total() {
        let a = set_from(&[("w", vec![1.0])]);
        let b = set_from(&[("w", vec![3.0])]);
        assert!(matches!(
            aggregate_weighted(&[a, b], &[0.0, 0.0]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_weighted_aggregate_rejects_length_mismatch() {
        let a = set_from(&[("w", vec![1.0])]);
        assert!(matches!(
            aggregate_weighted(&[a], &[1.0, 1.0]),
            Err(Error::InvalidParameter(_))
        ));
    }
}
