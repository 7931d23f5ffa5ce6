//! Local training pipeline: train, harden, compress, report.

use crate::client::update::{ClientUpdate, TrainingMetrics};
use crate::codec::{estimate_ratio, GradientCodec};
use crate::core::Result;
use crate::gradient::{add_noise, clip, statistics, GradientSet};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Output of one opaque local training step.
#[derive(Clone, Debug)]
pub struct StepOutput {
    /// Per-parameter gradients after the backward pass
    pub gradients: GradientSet,
    /// Final training loss
    pub loss: f64,
    /// Final training accuracy
    pub accuracy: f64,
}

/// An opaque local training step.
///
/// The forward/backward pass and optimizer live behind this trait; the
/// pipeline only consumes the gradients and metrics it yields.
#[async_trait]
pub trait TrainingStep {
    async fn run(&mut self) -> Result<StepOutput>;
}

/// Knobs applied between training and compression.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Global L2 clipping bound, if any
    pub clip_norm: Option<f32>,
    /// Gaussian noise standard deviation, if any
    pub noise_sigma: Option<f32>,
}

/// Builds transmit-ready updates from local training steps.
pub struct UpdatePipeline {
    codec: GradientCodec,
    options: PipelineOptions,
}

impl UpdatePipeline {
    /// Create a pipeline around a configured codec.
    pub fn new(codec: GradientCodec) -> Self {
        Self {
            codec,
            options: PipelineOptions::default(),
        }
    }

    /// Set the hardening options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run one training step and turn its gradients into a client update.
    ///
    /// Order matches the transmission path: clip, then noise, then compress.
    pub async fn produce_update<T, R>(&self, step: &mut T, rng: &mut R) -> Result<ClientUpdate>
    where
        T: TrainingStep + Send,
        R: Rng,
    {
        let output = step.run().await?;

        let stats = statistics(&output.gradients)?;
        info!(
            num_parameters = stats.num_parameters,
            total_elements = stats.total_elements,
            l2_norm = stats.l2_norm,
            "Extracted local gradients"
        );

        let mut gradients = output.gradients;
        if let Some(max_norm) = self.options.clip_norm {
            gradients = clip(&gradients, max_norm)?;
            info!(max_norm, "Applied global gradient clipping");
        }
        if let Some(sigma) = self.options.noise_sigma {
            gradients = add_noise(&gradients, sigma, rng)?;
            info!(sigma, "Injected Gaussian noise");
        }

        let envelope = self.codec.compress(&gradients)?;
        let ratio = estimate_ratio(&gradients, &envelope);
        info!(method = %envelope.method(), ratio, "Compressed gradients");

        let metrics = TrainingMetrics {
            loss: output.loss,
            accuracy: output.accuracy,
            compression_method: envelope.method(),
        };
        Ok(ClientUpdate::new(envelope, metrics))
    }
}
