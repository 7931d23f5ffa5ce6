//! Client update payloads and persistence.

use crate::codec::{CompressedEnvelope, CompressionMethod};
use crate::core::{now, Digest256, Error, Result, Timestamp};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use uuid::Uuid;

/// Metrics reported alongside a gradient update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Final training loss
    pub loss: f64,
    /// Final training accuracy
    pub accuracy: f64,
    /// Method used on the accompanying gradients
    pub compression_method: CompressionMethod,
}

impl TrainingMetrics {
    /// Render as a pretty JSON record.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a JSON record.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

/// A complete update produced by one local training round: the compressed
/// gradients, the metrics record, and identifying metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    /// Unique update identifier
    pub id: String,
    /// Compressed gradient payload
    pub envelope: CompressedEnvelope,
    /// Training metrics for this round
    pub metrics: TrainingMetrics,
    /// Creation timestamp
    pub created: Timestamp,
}

impl ClientUpdate {
    /// Create a new update with a fresh id.
    pub fn new(envelope: CompressedEnvelope, metrics: TrainingMetrics) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            envelope,
            metrics,
            created: now(),
        }
    }

    /// Serialize with bincode, LZ4-compress, and write to `sink`.
    ///
    /// Returns the digest of the written bytes; it doubles as the content
    /// address a receiver can verify against.
    pub fn save<W: Write>(&self, sink: &mut W) -> Result<Digest256> {
        let encoded = bincode::serialize(self)?;
        let compressed = compress_prepend_size(&encoded);
        let digest = Digest256::compute(&compressed);
        sink.write_all(&compressed)?;
        Ok(digest)
    }

    /// Read, LZ4-decompress, and decode an update from `source`.
    pub fn load<R: Read>(source: &mut R) -> Result<Self> {
        let bytes = Self::read_all(source)?;
        Self::decode(&bytes)
    }

    /// Like [`load`](Self::load), but verify the payload digest before
    /// decoding a single byte.
    pub fn load_verified<R: Read>(source: &mut R, expected: &Digest256) -> Result<Self> {
        let bytes = Self::read_all(source)?;
        let actual = Digest256::compute(&bytes);
        if actual != *expected {
            return Err(Error::IntegrityCheckFailed {
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }
        Self::decode(&bytes)
    }

    fn read_all<R: Read>(source: &mut R) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let encoded = decompress_size_prepended(bytes)
            .map_err(|e| Error::DecompressionFailed(e.to_string()))?;
        bincode::deserialize(&encoded).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}
