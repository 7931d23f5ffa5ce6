//! Affine gradient quantization.

use crate::core::{Error, Result};
use crate::gradient::{GradientSet, Tensor};
use serde::{Deserialize, Serialize};

/// Largest supported logical bit-depth. Storage is always one byte per
/// element; `bits` only sets the quantization step via `2^bits - 1`.
pub const MAX_BITS: u8 = 8;

/// Per-tensor affine transform parameters.
///
/// `scale >= 0`; `scale == 0` marks a constant tensor whose value is held
/// exactly in `zero_point`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantizationParams {
    pub scale: f32,
    pub zero_point: f32,
}

/// One quantized tensor: u8 codes plus the parameters to invert them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantizedTensor {
    /// Original tensor shape
    pub shape: Vec<usize>,
    /// One code per element, row-major
    pub values: Vec<u8>,
    /// Affine parameters for reconstruction
    pub params: QuantizationParams,
}

impl QuantizedTensor {
    /// Number of quantized elements.
    pub fn element_count(&self) -> usize {
        self.values.len()
    }
}

/// Quantized analogue of a gradient set, keyed by the same parameter names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantizedPayload {
    entries: Vec<(String, QuantizedTensor)>,
}

impl QuantizedPayload {
    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the payload holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over (name, tensor) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QuantizedTensor)> {
        self.entries.iter().map(|(n, t)| (n.as_str(), t))
    }
}

/// Quantize every tensor independently to u8 codes.
///
/// Per tensor: `scale = (max - min) / (2^bits - 1)` and each element maps to
/// `round((x - min) / scale)` clamped to `[0, 2^bits - 1]`. A constant tensor
/// stores all-zero codes with `scale == 0` and is reconstructed exactly.
pub fn quantize(set: &GradientSet, bits: u8) -> Result<QuantizedPayload> {
    if bits == 0 || bits > MAX_BITS {
        return Err(Error::InvalidParameter(format!(
            "bits must be in 1..={}, got {}",
            MAX_BITS, bits
        )));
    }
    let levels = ((1u16 << bits) - 1) as f32;

    let mut entries = Vec::with_capacity(set.len());
    for (name, tensor) in set.iter() {
        let lo = tensor.min();
        let hi = tensor.max();
        let scale = (hi - lo) / levels;

        let (values, params) = if scale > 0.0 {
            let values = tensor
                .data()
                .iter()
                .map(|&x| ((x - lo) / scale).round().clamp(0.0, levels) as u8)
                .collect();
            (
                values,
                QuantizationParams {
                    scale,
                    zero_point: lo,
                },
            )
        } else {
            // constant tensor: all codes zero, the value lives in zero_point
            (
                vec![0u8; tensor.element_count()],
                QuantizationParams {
                    scale: 0.0,
                    zero_point: lo,
                },
            )
        };

        entries.push((
            name.to_string(),
            QuantizedTensor {
                shape: tensor.shape().to_vec(),
                values,
                params,
            },
        ));
    }

    Ok(QuantizedPayload { entries })
}

/// Reconstruct a dense gradient set from quantized codes.
///
/// Each element maps back as `code * scale + zero_point`. Payload internals
/// are validated before any tensor is built.
pub fn dequantize(payload: &QuantizedPayload) -> Result<GradientSet> {
    let mut set = GradientSet::new();
    for (name, quantized) in payload.iter() {
        let expected: usize = quantized.shape.iter().product();
        if expected != quantized.values.len() {
            return Err(Error::ShapeMismatch(format!(
                "quantized tensor '{}': shape {:?} implies {} elements, got {}",
                name,
                quantized.shape,
                expected,
                quantized.values.len()
            )));
        }

        let QuantizationParams { scale, zero_point } = quantized.params;
        let data = quantized
            .values
            .iter()
            .map(|&code| code as f32 * scale + zero_point)
            .collect();
        set.insert(name, Tensor::new(quantized.shape.clone(), data)?)?;
    }
    Ok(set)
}
