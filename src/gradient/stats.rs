//! Aggregate statistics over a gradient set.

use crate::core::{Error, Result};
use crate::gradient::set::GradientSet;
use serde::Serialize;

/// Numeric descriptors of a gradient set, for logging and diagnostics.
#[derive(Clone, Debug, Serialize)]
pub struct GradientStatistics {
    /// Number of named parameters
    pub num_parameters: usize,
    /// Sum of element counts over all tensors
    pub total_elements: usize,
    /// Global L2 norm over all elements
    pub l2_norm: f64,
    /// Largest absolute element value
    pub max_abs_value: f64,
    /// Smallest absolute element value
    pub min_abs_value: f64,
    /// Mean of per-tensor means (not the global element mean)
    pub mean_value: f64,
}

/// Global L2 norm over every tensor, computed per-tensor without
/// materializing one concatenated buffer.
pub fn global_l2_norm(set: &GradientSet) -> f64 {
    set.iter()
        .map(|(_, tensor)| {
            tensor
                .data()
                .iter()
                .map(|&x| (x as f64) * (x as f64))
                .sum::<f64>()
        })
        .sum::<f64>()
        .sqrt()
}

/// Compute statistics over a gradient set.
///
/// `mean_value` is the mean of per-tensor means; tensors of different sizes
/// contribute equally, matching the statistics a training log reports.
pub fn statistics(set: &GradientSet) -> Result<GradientStatistics> {
    if set.is_empty() {
        return Err(Error::EmptyInput(
            "cannot compute statistics over an empty gradient set".to_string(),
        ));
    }

    let mut max_abs = f64::NEG_INFINITY;
    let mut min_abs = f64::INFINITY;
    let mut mean_sum = 0.0;

    for (_, tensor) in set.iter() {
        let mut tensor_sum = 0.0;
        for &x in tensor.data() {
            let abs = (x as f64).abs();
            max_abs = max_abs.max(abs);
            min_abs = min_abs.min(abs);
            tensor_sum += x as f64;
        }
        mean_sum += tensor_sum / tensor.element_count() as f64;
    }

    Ok(GradientStatistics {
        num_parameters: set.len(),
        total_elements: set.total_elements(),
        l2_norm: global_l2_norm(set),
        max_abs_value: max_abs,
        min_abs_value: min_abs,
        mean_value: mean_sum / set.len() as f64,
    })
}
