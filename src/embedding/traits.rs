// Embedding provider trait: the swap-ready boundary around vector training.
//
// A provider consumes the labeled corpus and hands back one vector per
// label. The pipeline never looks inside: TF-IDF vectors and ONNX sentence
// embeddings are interchangeable behind this trait.

use anyhow::Result;

use super::store::VectorStore;
use crate::corpus::Corpus;

/// Trait for turning a labeled corpus into a label -> vector mapping.
pub trait EmbeddingProvider {
    /// Short name recorded in the saved vector store.
    fn name(&self) -> &str;

    /// Train (or infer) one vector per corpus document.
    ///
    /// Every corpus label must be queryable in the returned store.
    fn train(&self, corpus: &Corpus) -> Result<VectorStore>;
}
