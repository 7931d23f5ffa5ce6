//! Compression ratio estimation.

use crate::codec::envelope::CompressedEnvelope;
use crate::gradient::GradientSet;

/// Dense f32 element
const DENSE_BYTES_PER_ELEMENT: usize = 4;
/// Quantized u8 code
const QUANTIZED_BYTES_PER_ELEMENT: usize = 1;
/// Per-tensor scale + zero point, approximated as two f64 values
const QUANTIZATION_PARAM_OVERHEAD: usize = 16;
/// Sparse kept entry: f32 value + u32 index
const SPARSE_BYTES_PER_ENTRY: usize = 8;

/// Estimated wire size of an envelope's payload, in bytes.
///
/// These are payload estimates, not serialized-container sizes: container
/// framing, names, and shapes are deliberately excluded so the ratio
/// reflects the codec itself.
pub fn estimated_payload_bytes(envelope: &CompressedEnvelope) -> usize {
    match envelope {
        CompressedEnvelope::Identity(set) => DENSE_BYTES_PER_ELEMENT * set.total_elements(),
        CompressedEnvelope::Quantized(payload) => {
            let codes: usize = payload
                .iter()
                .map(|(_, t)| QUANTIZED_BYTES_PER_ELEMENT * t.element_count())
                .sum();
            codes + QUANTIZATION_PARAM_OVERHEAD * payload.len()
        }
        CompressedEnvelope::Sparse(payload) => payload
            .iter()
            .map(|(_, t)| SPARSE_BYTES_PER_ENTRY * t.kept())
            .sum(),
    }
}

/// Estimated size reduction: original bytes over compressed bytes.
///
/// Returns `1.0` when the compressed estimate is zero.
pub fn estimate_ratio(original: &GradientSet, compressed: &CompressedEnvelope) -> f64 {
    let original_bytes = DENSE_BYTES_PER_ELEMENT * original.total_elements();
    let compressed_bytes = estimated_payload_bytes(compressed);
    if compressed_bytes == 0 {
        return 1.0;
    }
    original_bytes as f64 / compressed_bytes as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::envelope::{CompressionMethod, GradientCodec};
    use crate::codec::quantize::QuantizedPayload;
    use crate::gradient::Tensor;

    fn large_set() -> GradientSet {
        let mut set = GradientSet::new();
        let data: Vec<f32> = (0..256).map(|i| (i as f32) * 0.01 - 1.0).collect();
        set.insert("w", Tensor::new(vec![16, 16], data).unwrap())
            .unwrap();
        set
    }

    #[test]
    fn test_quantization_shrinks_nonconstant_tensors() {
        let set = large_set();
        let envelope = GradientCodec::new(CompressionMethod::Quantize)
            .compress(&set)
            .unwrap();
        // 1024 dense bytes vs 256 codes + 16 params
        let ratio = estimate_ratio(&set, &envelope);
        assert!(ratio > 1.0);
        assert!((ratio - 1024.0 / 272.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_estimate_counts_values_and_indices() {
        let set = large_set();
        let envelope = GradientCodec::new(CompressionMethod::Sparsify)
            .with_sparsity(0.9)
            .compress(&set)
            .unwrap();
        // k = round(256 * 0.1) = 26 entries at 8 bytes each
        assert_eq!(estimated_payload_bytes(&envelope), 26 * 8);
        assert!(estimate_ratio(&set, &envelope) > 1.0);
    }

    #[test]
    fn test_identity_ratio_is_one() {
        let set = large_set();
        let envelope = GradientCodec::new(CompressionMethod::None)
            .compress(&set)
            .unwrap();
        assert!((estimate_ratio(&set, &envelope) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_compressed_estimate_guards_division() {
        let set = large_set();
        let empty = CompressedEnvelope::Quantized(QuantizedPayload::default());
        assert_eq!(estimate_ratio(&set, &empty), 1.0);
    }
}
