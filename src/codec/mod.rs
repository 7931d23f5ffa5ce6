//! Gradient Compression Codecs
//!
//! Lossy transforms from a dense gradient set to a compact wire
//! representation, and their inverses:
//! - Affine quantization to one byte per element
//! - Top-k magnitude sparsification
//! - An identity passthrough
//!
//! Every payload travels inside a [`CompressedEnvelope`] carrying its method
//! tag, so decompression never depends on caller context.

pub mod envelope;
pub mod quantize;
pub mod ratio;
pub mod sparsify;

pub use envelope::{CompressedEnvelope, CompressionMethod, GradientCodec};
pub use quantize::{dequantize, quantize, QuantizationParams, QuantizedPayload, QuantizedTensor};
pub use ratio::{estimate_ratio, estimated_payload_bytes};
pub use sparsify::{densify, sparsify, SparsePayload, SparseTensor};
