//! Gaussian noise injection for differential privacy.

use crate::core::{Error, Result};
use crate::gradient::set::GradientSet;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Add an independent zero-mean Gaussian sample with standard deviation
/// `sigma` to every element of every tensor.
///
/// The RNG is injected by the caller, so a seeded generator reproduces the
/// same perturbation. `sigma == 0` returns a copy without drawing samples.
pub fn add_noise<R: Rng>(set: &GradientSet, sigma: f32, rng: &mut R) -> Result<GradientSet> {
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "sigma must be non-negative and finite, got {}",
            sigma
        )));
    }
    if sigma == 0.0 {
        return Ok(set.clone());
    }

    let normal = Normal::new(0.0f32, sigma)
        .map_err(|e| Error::InvalidParameter(format!("invalid noise distribution: {}", e)))?;

    Ok(set.map_tensors(|t| t.map(|x| x + normal.sample(rng))))
}
