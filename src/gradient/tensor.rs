//! Dense tensor type for gradient payloads.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// An immutable multi-dimensional array of `f32` values with a fixed shape.
///
/// The element count is the product of the shape dimensions; an empty shape
/// denotes a scalar with one element. Transforms return new tensors rather
/// than mutating in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor from a shape and flat row-major data.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        if shape.iter().any(|&dim| dim == 0) {
            return Err(Error::InvalidParameter(format!(
                "tensor dimensions must be positive, got {:?}",
                shape
            )));
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::ShapeMismatch(format!(
                "shape {:?} implies {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Create a 1-D tensor from raw values.
    pub fn from_vec(data: Vec<f32>) -> Result<Self> {
        let len = data.len();
        Self::new(vec![len], data)
    }

    /// Create an all-zero tensor with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Result<Self> {
        let len = shape.iter().product();
        Self::new(shape, vec![0.0; len])
    }

    /// Get the shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.data.len()
    }

    /// Flat row-major view of the elements.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Check shape compatibility with another tensor.
    pub fn same_shape(&self, other: &Tensor) -> bool {
        self.shape == other.shape
    }

    /// Element-wise transform into a new tensor with the same shape.
    pub fn map<F: FnMut(f32) -> f32>(&self, mut f: F) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Smallest element value.
    pub fn min(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest element value.
    pub fn max(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}
