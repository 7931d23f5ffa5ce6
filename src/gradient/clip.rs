//! Global gradient clipping.

use crate::core::{Error, Result};
use crate::gradient::set::GradientSet;
use crate::gradient::stats::global_l2_norm;

/// Guards against division by zero when the norm is at the bound.
const CLIP_EPSILON: f64 = 1e-6;

/// Rescale a gradient set so its global L2 norm does not exceed `max_norm`.
///
/// One shared scale factor `max_norm / (norm + 1e-6)` is applied to every
/// tensor; this is a global clip, not per-layer clipping. When the norm is
/// already within the bound the input is returned unchanged (as a copy).
pub fn clip(set: &GradientSet, max_norm: f32) -> Result<GradientSet> {
    if !max_norm.is_finite() || max_norm <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "max_norm must be positive and finite, got {}",
            max_norm
        )));
    }

    let norm = global_l2_norm(set);
    if norm <= max_norm as f64 {
        return Ok(set.clone());
    }

    let coef = (max_norm as f64 / (norm + CLIP_EPSILON)) as f32;
    Ok(set.map_tensors(|t| t.map(|x| x * coef)))
}
