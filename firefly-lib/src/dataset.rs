use std::io::Read;

use firefly_data::{QuantityKind, TimedDataEntry, TimedDataset};
use tracing::debug;

use crate::error::{FireflyError, Result};
use crate::timed::{FlowRate, SpecificImpulse};

/// A set of named propulsion curves loaded from a dataset blob.
///
/// Blobs are postcard-serialized [`TimedDataset`]s, usually zstd-compressed by
/// `firefly-generate`. Curves are validated when a quantity is built from them,
/// not when the blob is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    data: TimedDataset,
}

impl Dataset {
    pub fn new(data: TimedDataset) -> Self {
        Dataset { data }
    }

    /// Decode a zstd-compressed postcard blob.
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        let mut decoder = ruzstd::decoding::StreamingDecoder::new(bytes)
            .map_err(|e| FireflyError::DataError(format!("failed to create zstd decoder: {e}")))?;
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| FireflyError::DataError(format!("failed to decompress data: {e}")))?;
        debug!(
            compressed = bytes.len(),
            decompressed = decompressed.len(),
            "decompressed dataset"
        );
        Self::from_bytes(&decompressed)
    }

    /// Decode an uncompressed postcard blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let data: TimedDataset = postcard::from_bytes(bytes)
            .map_err(|e| FireflyError::DataError(format!("failed to deserialize data: {e}")))?;
        debug!(entries = data.entries.len(), tag = %data.version.tag, "loaded dataset");
        Ok(Dataset { data })
    }

    /// Serialize to an uncompressed postcard blob.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(&self.data)
            .map_err(|e| FireflyError::DataError(format!("failed to serialize data: {e}")))
    }

    /// Access the raw records.
    pub fn raw(&self) -> &TimedDataset {
        &self.data
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.data.entries.iter().map(|e| e.name.as_str())
    }

    fn entry(&self, name: &str, kind: QuantityKind) -> Result<&TimedDataEntry> {
        self.data
            .entries
            .iter()
            .find(|e| e.name == name && e.kind == kind)
            .ok_or_else(|| FireflyError::UnknownEntry(name.to_string()))
    }

    /// Build the flow rate stored under `name`.
    pub fn flow_rate(&self, name: &str) -> Result<FlowRate> {
        FlowRate::from_record(&self.entry(name, QuantityKind::FlowRate)?.data)
    }

    /// Build the specific impulse stored under `name`.
    pub fn specific_impulse(&self, name: &str) -> Result<SpecificImpulse> {
        SpecificImpulse::from_record(&self.entry(name, QuantityKind::SpecificImpulse)?.data)
    }
}
