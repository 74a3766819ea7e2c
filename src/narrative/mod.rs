//! Narrative augmentation — optional external text enrichment.
//!
//! Everything here is best-effort: on any failure (network, timeout,
//! malformed payload) the adapter falls back to deterministic local text.
//! The numeric score and tier are never derived from this layer.

pub mod adapter;
pub mod ollama;

pub use adapter::{NarrativeAugmenter, TranscriptAnalysis};
pub use ollama::OllamaService;

use async_trait::async_trait;

use crate::error::NarrativeError;

/// Boundary to the external text service.
///
/// One prompt in, raw completion text out. The adapter owns prompt
/// construction, response cleanup, and fallbacks; implementations only
/// move bytes.
#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError>;
}
