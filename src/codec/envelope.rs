//! Self-describing compressed gradient payloads.

use crate::codec::quantize::{dequantize, quantize, QuantizedPayload};
use crate::codec::sparsify::{densify, sparsify, SparsePayload};
use crate::core::{Error, Result};
use crate::gradient::GradientSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported compression methods, as a closed sum type.
///
/// Configuration strings resolve through [`FromStr`]; unknown names fail
/// with [`Error::UnsupportedMethod`] instead of silently defaulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    /// Identity passthrough
    None,
    /// Affine quantization to one byte per element
    Quantize,
    /// Top-k magnitude sparsification
    Sparsify,
}

impl CompressionMethod {
    /// Canonical lowercase name, as used in configuration and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Quantize => "quantize",
            Self::Sparsify => "sparsify",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompressionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "quantize" => Ok(Self::Quantize),
            "sparsify" => Ok(Self::Sparsify),
            other => Err(Error::UnsupportedMethod(other.to_string())),
        }
    }
}

/// A compressed gradient payload tagged with the method that produced it.
///
/// The tag travels with the data, so decompression is self-describing and
/// never depends on out-of-band knowledge of the producing codec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompressedEnvelope {
    /// Uncompressed gradients
    Identity(GradientSet),
    /// Quantized codes plus per-tensor affine parameters
    Quantized(QuantizedPayload),
    /// Top-k values with flat indices
    Sparse(SparsePayload),
}

impl CompressedEnvelope {
    /// The method that produced this envelope.
    pub fn method(&self) -> CompressionMethod {
        match self {
            Self::Identity(_) => CompressionMethod::None,
            Self::Quantized(_) => CompressionMethod::Quantize,
            Self::Sparse(_) => CompressionMethod::Sparsify,
        }
    }
}

/// Facade dispatching to the quantization and sparsification codecs.
#[derive(Clone, Debug)]
pub struct GradientCodec {
    method: CompressionMethod,
    bits: u8,
    sparsity: f32,
}

impl GradientCodec {
    /// Default logical bit-depth for quantization.
    pub const DEFAULT_BITS: u8 = 8;
    /// Default fraction of elements dropped by sparsification.
    pub const DEFAULT_SPARSITY: f32 = 0.9;

    /// Create a codec for the given method with default parameters.
    pub fn new(method: CompressionMethod) -> Self {
        Self {
            method,
            bits: Self::DEFAULT_BITS,
            sparsity: Self::DEFAULT_SPARSITY,
        }
    }

    /// Set the quantization bit-depth. Validated at compression time.
    pub fn with_bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Set the sparsification fraction. Validated at compression time.
    pub fn with_sparsity(mut self, sparsity: f32) -> Self {
        self.sparsity = sparsity;
        self
    }

    /// The configured method.
    pub fn method(&self) -> CompressionMethod {
        self.method
    }

    /// Compress a gradient set into a tagged envelope.
    ///
    /// An empty set fails with [`Error::EmptyInput`]: it is never a valid
    /// training output and compressing it would only propagate the problem.
    pub fn compress(&self, set: &GradientSet) -> Result<CompressedEnvelope> {
        if set.is_empty() {
            return Err(Error::EmptyInput(
                "cannot compress an empty gradient set".to_string(),
            ));
        }
        match self.method {
            CompressionMethod::None => Ok(CompressedEnvelope::Identity(set.clone())),
            CompressionMethod::Quantize => {
                Ok(CompressedEnvelope::Quantized(quantize(set, self.bits)?))
            }
            CompressionMethod::Sparsify => {
                Ok(CompressedEnvelope::Sparse(sparsify(set, self.sparsity)?))
            }
        }
    }

    /// Invert an envelope using only the method tag it carries.
    pub fn decompress(envelope: &CompressedEnvelope) -> Result<GradientSet> {
        match envelope {
            CompressedEnvelope::Identity(set) => Ok(set.clone()),
            CompressedEnvelope::Quantized(payload) => dequantize(payload),
            CompressedEnvelope::Sparse(payload) => densify(payload),
        }
    }
}

impl Default for GradientCodec {
    fn default() -> Self {
        Self::new(CompressionMethod::Quantize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::Tensor;

    fn sample_set() -> GradientSet {
        let mut set = GradientSet::new();
        set.insert(
            "fc1.weight",
            Tensor::new(vec![2, 2], vec![0.5, -1.0, 2.0, -0.25]).unwrap(),
        )
        .unwrap();
        set.insert("fc1.bias", Tensor::from_vec(vec![0.1, -0.1]).unwrap())
            .unwrap();
        set
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "quantize".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::Quantize
        );
        assert_eq!(
            "sparsify".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::Sparsify
        );
        assert_eq!(
            "none".parse::<CompressionMethod>().unwrap(),
            CompressionMethod::None
        );
    }

    #[test]
    fn test_unknown_method_rejected() {
        let result = "gzip".parse::<CompressionMethod>();
        assert!(matches!(result, Err(Error::UnsupportedMethod(_))));
    }

    #[test]
    fn test_method_display_roundtrip() {
        for method in [
            CompressionMethod::None,
            CompressionMethod::Quantize,
            CompressionMethod::Sparsify,
        ] {
            assert_eq!(method.to_string().parse::<CompressionMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_identity_roundtrip() {
        let set = sample_set();
        let envelope = GradientCodec::new(CompressionMethod::None)
            .compress(&set)
            .unwrap();
        assert_eq!(envelope.method(), CompressionMethod::None);
        assert_eq!(GradientCodec::decompress(&envelope).unwrap(), set);
    }

    #[test]
    fn test_dispatch_by_envelope_tag_only() {
        let set = sample_set();
        // compress with three differently configured codecs, decompress with none of them
        for method in [
            CompressionMethod::None,
            CompressionMethod::Quantize,
            CompressionMethod::Sparsify,
        ] {
            let envelope = GradientCodec::new(method).compress(&set).unwrap();
            assert_eq!(envelope.method(), method);
            let restored = GradientCodec::decompress(&envelope).unwrap();
            assert_eq!(
                restored.names().collect::<Vec<_>>(),
                set.names().collect::<Vec<_>>()
            );
            for (name, tensor) in set.iter() {
                assert!(restored.get(name).unwrap().same_shape(tensor));
            }
        }
    }

    #[test]
    fn test_compress_empty_set_fails() {
        let codec = GradientCodec::default();
        let result = codec.compress(&GradientSet::new());
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_invalid_codec_parameters_surface_at_compress() {
        let set = sample_set();
        let codec = GradientCodec::new(CompressionMethod::Quantize).with_bits(12);
        assert!(matches!(
            codec.compress(&set),
            Err(Error::InvalidParameter(_))
        ));

        let codec = GradientCodec::new(CompressionMethod::Sparsify).with_sparsity(1.0);
        assert!(matches!(
            codec.compress(&set),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_envelope_tag_roundtrips_through_bincode() {
        let set = sample_set();
        for method in [
            CompressionMethod::None,
            CompressionMethod::Quantize,
            CompressionMethod::Sparsify,
        ] {
            let envelope = GradientCodec::new(method).compress(&set).unwrap();
            let bytes = bincode::serialize(&envelope).unwrap();
            let decoded: CompressedEnvelope = bincode::deserialize(&bytes).unwrap();
            assert_eq!(decoded.method(), method);
            assert_eq!(decoded, envelope);
        }
    }

    #[test]
    fn test_envelope_tag_roundtrips_through_json() {
        let set = sample_set();
        let envelope = GradientCodec::new(CompressionMethod::Sparsify)
            .compress(&set)
            .unwrap();
        let json = serde_json::to_string(&envelope).unwrap();
        let decoded: CompressedEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.method(), CompressionMethod::Sparsify);
        assert_eq!(decoded, envelope);
    }
}
