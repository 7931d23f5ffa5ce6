//! Top-k magnitude sparsification.

use crate::core::{Error, Result};
use crate::gradient::{GradientSet, Tensor};
use serde::{Deserialize, Serialize};

/// One sparsified tensor: the k largest-magnitude elements with their flat
/// indices into the original row-major layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseTensor {
    /// Kept element values, signed, in descending magnitude order
    pub values: Vec<f32>,
    /// Flat 0-based indices, one per kept value, pairwise distinct
    pub indices: Vec<u32>,
    /// Original tensor shape
    pub shape: Vec<usize>,
}

impl SparseTensor {
    /// Number of kept entries.
    pub fn kept(&self) -> usize {
        self.values.len()
    }
}

/// Sparse analogue of a gradient set, keyed by the same parameter names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparsePayload {
    entries: Vec<(String, SparseTensor)>,
}

impl SparsePayload {
    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, tensor) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SparseTensor)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}

/// Keep only the top-k elements of each tensor by absolute value.
///
/// `sparsity` is the fraction of elements to drop: per tensor,
/// `k = max(1, round(n * (1 - sparsity)))`. Ties on magnitude break toward
/// the lower index, so the selection is deterministic for a fixed input.
pub fn sparsify(set: &GradientSet, sparsity: f32) -> Result<SparsePayload> {
    if !(0.0..1.0).contains(&sparsity) {
        return Err(Error::InvalidParameter(format!(
            "sparsity must be in [0, 1), got {}",
            sparsity
        )));
    }

    let mut entries = Vec::with_capacity(set.len());
    for (name, tensor) in set.iter() {
        let n = tensor.element_count();
        if n > u32::MAX as usize {
            return Err(Error::InvalidParameter(format!(
                "tensor '{}' has {} elements, more than sparse indices can address",
                name, n
            )));
        }
        let k = ((n as f64) * (1.0 - sparsity as f64)).round() as usize;
        let k = k.max(1);

        let data = tensor.data();
        let mut order: Vec<u32> = (0..n as u32).collect();
        order.sort_unstable_by(|&a, &b| {
            data[b as usize]
                .abs()
                .total_cmp(&data[a as usize].abs())
                .then(a.cmp(&b))
        });
        order.truncate(k);

        entries.push((
            name.to_string(),
            SparseTensor {
                values: order.iter().map(|&i| data[i as usize]).collect(),
                indices: order,
                shape: tensor.shape().to_vec(),
            },
        ));
    }

    Ok(SparsePayload { entries })
}

/// Rebuild dense tensors by scattering kept values into zero buffers.
///
/// Indices are bounds-checked against the shape before any write; dropped
/// positions come back as zero, so this inverts `sparsify` exactly only when
/// every element was kept.
pub fn densify(payload: &SparsePayload) -> Result<GradientSet> {
    let mut set = GradientSet::new();
    for (name, sparse) in payload.iter() {
        if sparse.values.len() != sparse.indices.len() {
            return Err(Error::ShapeMismatch(format!(
                "sparse tensor '{}': {} values but {} indices",
                name,
                sparse.values.len(),
                sparse.indices.len()
            )));
        }

        let n: usize = sparse.shape.iter().product();
        let mut data = vec![0.0f32; n];
        for (&index, &value) in sparse.indices.iter().zip(&sparse.values) {
            let i = index as usize;
            if i >= n {
                return Err(Error::ShapeMismatch(format!(
                    "sparse tensor '{}': index {} out of bounds for {} elements",
                    name, index, n
                )));
            }
            data[i] = value;
        }
        set.insert(name, Tensor::new(sparse.shape.clone(), data)?)?;
    }
    Ok(set)
}
