// VectorStore: the trained label -> vector mapping.
//
// Produced by an EmbeddingProvider, saved to disk after training, and loaded
// again by `compare`. Label order is the training order and is preserved
// through a save/load cycle; pairing relies on it for deterministic output.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One labeled vector as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVector {
    label: String,
    vector: Vec<f64>,
}

/// On-disk layout of a saved store.
#[derive(Debug, Serialize, Deserialize)]
struct StoredVectors {
    embedder: String,
    dimensions: usize,
    trained_at: DateTime<Utc>,
    documents: Vec<StoredVector>,
}

/// Immutable mapping from document label to its vector.
#[derive(Debug, Clone)]
pub struct VectorStore {
    embedder: String,
    dimensions: usize,
    trained_at: DateTime<Utc>,
    labels: Vec<String>,
    vectors: Vec<Vec<f64>>,
    index: HashMap<String, usize>,
}

impl VectorStore {
    /// Build a store from labels and vectors in training order.
    ///
    /// Fails if the lengths differ, a label repeats, or a vector has the
    /// wrong dimension.
    pub fn new(
        embedder: impl Into<String>,
        dimensions: usize,
        labels: Vec<String>,
        vectors: Vec<Vec<f64>>,
    ) -> Result<Self> {
        Self::with_timestamp(embedder, dimensions, labels, vectors, Utc::now())
    }

    fn with_timestamp(
        embedder: impl Into<String>,
        dimensions: usize,
        labels: Vec<String>,
        vectors: Vec<Vec<f64>>,
        trained_at: DateTime<Utc>,
    ) -> Result<Self> {
        if labels.len() != vectors.len() {
            anyhow::bail!(
                "Label/vector count mismatch: {} labels, {} vectors",
                labels.len(),
                vectors.len()
            );
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, (label, vector)) in labels.iter().zip(&vectors).enumerate() {
            if vector.len() != dimensions {
                anyhow::bail!(
                    "Vector for {label} has {} dimensions, expected {dimensions}",
                    vector.len()
                );
            }
            if index.insert(label.clone(), i).is_some() {
                anyhow::bail!("Duplicate label in vector store: {label}");
            }
        }

        Ok(Self {
            embedder: embedder.into(),
            dimensions,
            trained_at,
            labels,
            vectors,
            index,
        })
    }

    /// Look up the vector for a label.
    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.index.get(label).map(|&i| self.vectors[i].as_slice())
    }

    /// Labels in training order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Name of the provider that produced these vectors.
    pub fn embedder(&self) -> &str {
        &self.embedder
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    /// Write the store as JSON, overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory for {}", path.display())
                })?;
            }
        }

        let stored = StoredVectors {
            embedder: self.embedder.clone(),
            dimensions: self.dimensions,
            trained_at: self.trained_at,
            documents: self
                .labels
                .iter()
                .zip(&self.vectors)
                .map(|(label, vector)| StoredVector {
                    label: label.clone(),
                    vector: vector.clone(),
                })
                .collect(),
        };

        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create vector store {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer(&mut writer, &stored)
            .with_context(|| format!("Failed to write vector store {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush vector store {}", path.display()))?;

        info!(
            path = %path.display(),
            documents = self.labels.len(),
            "Saved vector store"
        );
        Ok(())
    }

    /// Load a store previously written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Vector store not found at {}. Run `abstract2vec train` first.",
                path.display()
            );
        }

        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open vector store {}", path.display()))?;
        let stored: StoredVectors = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse vector store {}", path.display()))?;

        let (labels, vectors) = stored
            .documents
            .into_iter()
            .map(|d| (d.label, d.vector))
            .unzip();

        let store = Self::with_timestamp(
            stored.embedder,
            stored.dimensions,
            labels,
            vectors,
            stored.trained_at,
        )?;

        info!(
            path = %path.display(),
            documents = store.len(),
            embedder = store.embedder(),
            "Loaded vector store"
        );
        Ok(store)
    }
}
