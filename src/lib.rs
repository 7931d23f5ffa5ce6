//! # fedcodec - Gradient compression for federated learning clients
//!
//! A federated-learning client trains locally and ships a gradient update to
//! an aggregator. This crate provides the numeric plumbing around that update:
//! - **gradient**: named tensor sets, statistics, clipping, noise injection,
//!   aggregation
//! - **codec**: lossy quantization and sparsification behind a self-describing
//!   compressed envelope
//! - **client**: the update pipeline and payload persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use fedcodec::codec::{CompressionMethod, GradientCodec};
//! use fedcodec::gradient::{GradientSet, Tensor};
//!
//! fn main() -> fedcodec::Result<()> {
//!     let mut gradients = GradientSet::new();
//!     gradients.insert("fc1.weight", Tensor::from_vec(vec![0.5, -1.25, 3.0])?)?;
//!
//!     let codec = GradientCodec::new(CompressionMethod::Quantize);
//!     let envelope = codec.compress(&gradients)?;
//!     let restored = GradientCodec::decompress(&envelope)?;
//!     assert_eq!(restored.len(), gradients.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod core;
pub mod gradient;

pub use crate::core::error::{Error, Result};
