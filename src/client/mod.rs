//! Client Update Pipeline
//!
//! The path from a local training step to a transmit-ready artifact:
//! - An opaque, injectable training step produces gradients and metrics
//! - Optional clipping and noise injection harden the update
//! - The codec shrinks it, and persistence seals it with a content digest

pub mod pipeline;
pub mod update;

pub use pipeline::{PipelineOptions, StepOutput, TrainingStep, UpdatePipeline};
pub use update::{ClientUpdate, TrainingMetrics};
